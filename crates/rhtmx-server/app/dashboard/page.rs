// File: app/dashboard/page.rs
// Purpose: Dashboard with a streamed activity section

use std::time::Duration;

use rhtmx::{component, html, PageModule};

pub fn module() -> PageModule {
    PageModule::new(component(|cx| {
        let activity = cx.defer(html! { p { "Loading activity..." } }, async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(html! {
                ul {
                    li { "Deployed build #42" }
                    li { "Regenerated 3 static pages" }
                }
            })
        });

        Ok(html! {
            h1 { "Dashboard" }
            p { "Signed in as " strong { (cx.prop_str("user").unwrap_or("unknown")) } }
            section { h2 { "Recent activity" } (activity) }
        })
    }))
}

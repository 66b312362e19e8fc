//! Stores cookies received from a few responses and looks them up again the
//! way a cookie jar would for outgoing requests.
//!
//! Run with `RUST_LOG=kvcookies=debug` to see the store's key-value traffic.

use kvcookies::base::storeerror::StoreError;
use kvcookies::cookies::canonicalcookie::CanonicalCookie;
use kvcookies::kv::MemoryKv;
use kvcookies::store::{KvCookieStore, KvCookieStoreConfig};
use std::sync::Arc;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let kv = Arc::new(MemoryKv::disconnected());
    let store = KvCookieStore::open(kv.clone(), KvCookieStoreConfig::new().id("demo")).await?;

    let responses = [
        ("https://www.example.com/", "site=1; Domain=example.com; Path=/"),
        ("https://shop.example.com/cart/add", "cart=42; Secure; HttpOnly"),
        ("https://shop.example.com/account/", "__Host-sid=abc; Secure; Path=/"),
        ("https://other.org/", "tracker=x; Domain=example.com"),
    ];

    for (url, header) in responses {
        let url = Url::parse(url).map_err(|e| StoreError::cookie_parse(e.to_string()))?;
        match CanonicalCookie::from_set_cookie(&url, header) {
            Ok(cookie) => store.put_cookie(&cookie).await?,
            Err(e) => println!("rejected {:?} from {}: {}", header, url, e),
        }
    }

    println!("keys:");
    for key in kv.keys() {
        println!("  {}", key);
    }

    for (host, path) in [("shop.example.com", "/cart/view"), ("www.example.com", "/")] {
        let cookies = store.find_cookies(host, path, false).await?;
        let pairs: Vec<String> = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        println!("{}{} -> {}", host, path, pairs.join("; "));
    }

    store.remove_all_cookies().await?;
    println!("after clear: {} cookies", store.get_all_cookies().await?.len());
    Ok(())
}

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use dashmap::DashMap;
use tracing::info;

use crate::compactor;
use crate::engine::Engine;
use crate::limits::*;
use crate::observability::SHOPS_ACTIVE;

/// One engine per shop, created on first use. The shop is the database name
/// a client connects with, and each shop keeps its own WAL file.
pub struct ShopManager {
    engines: DashMap<String, Arc<Engine>>,
    data_dir: PathBuf,
    compact_threshold: u64,
    offset: FixedOffset,
    max_shops: usize,
}

/// Keep only characters that are safe in a file name.
fn sanitize(shop: &str) -> String {
    shop.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

impl ShopManager {
    pub fn new(data_dir: PathBuf, compact_threshold: u64, offset: FixedOffset) -> Self {
        Self {
            engines: DashMap::new(),
            data_dir,
            compact_threshold,
            offset,
            max_shops: MAX_SHOPS,
        }
    }

    /// Lower the shop cap. Values above `MAX_SHOPS` are clamped.
    pub fn with_max_shops(mut self, max_shops: usize) -> Self {
        self.max_shops = max_shops.min(MAX_SHOPS);
        self
    }

    pub fn get_or_create(&self, shop: &str) -> io::Result<Arc<Engine>> {
        if shop.len() > MAX_SHOP_NAME_LEN {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "shop name too long"));
        }
        let key = sanitize(shop);
        if key.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty shop name"));
        }
        if let Some(engine) = self.engines.get(&key) {
            return Ok(engine.value().clone());
        }
        // Checked before taking the entry: len() locks every shard.
        if self.engines.len() >= self.max_shops {
            return Err(io::Error::other("too many shops"));
        }

        let engine = match self.engines.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(e) => return Ok(e.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let wal_path = self.data_dir.join(format!("{key}.wal"));
                let engine = Arc::new(Engine::new(wal_path, self.offset)?);
                e.insert(engine.clone());
                engine
            }
        };

        let compactor_engine = engine.clone();
        let threshold = self.compact_threshold;
        tokio::spawn(async move {
            compactor::run_compactor(compactor_engine, threshold).await;
        });

        info!(shop = %key, "opened shop");
        metrics::gauge!(SHOPS_ACTIVE).set(self.engines.len() as f64);
        Ok(engine)
    }

    pub fn shop_count(&self) -> usize {
        self.engines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use ulid::Ulid;

    fn test_data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("salond_test_shop").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn manager(dir: PathBuf) -> ShopManager {
        ShopManager::new(dir, 1000, FixedOffset::east_opt(0).unwrap())
    }

    #[tokio::test]
    async fn shops_are_isolated() {
        let shops = manager(test_data_dir("isolation"));
        let north = shops.get_or_create("north").unwrap();
        let south = shops.get_or_create("south").unwrap();

        let id = Ulid::new();
        north.create_barber(id, "Sam".into(), None).await.unwrap();
        south.create_barber(id, "Kim".into(), None).await.unwrap();

        assert_eq!(north.list_barbers().await[0].name, "Sam");
        assert_eq!(south.list_barbers().await[0].name, "Kim");
        assert!(south.list_services().is_empty());
    }

    #[tokio::test]
    async fn wal_created_lazily() {
        let dir = test_data_dir("lazy");
        let shops = manager(dir.clone());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);

        shops.get_or_create("downtown").unwrap();
        assert!(dir.join("downtown.wal").exists());
        assert_eq!(shops.shop_count(), 1);
    }

    #[tokio::test]
    async fn same_engine_returned() {
        let shops = manager(test_data_dir("same"));
        let a = shops.get_or_create("foo").unwrap();
        let b = shops.get_or_create("foo").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn names_that_sanitize_alike_share_an_engine() {
        let shops = manager(test_data_dir("alias"));
        let a = shops.get_or_create("../evil").unwrap();
        let b = shops.get_or_create("evil").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(shops.shop_count(), 1);
    }

    #[tokio::test]
    async fn path_traversal_is_stripped() {
        let dir = test_data_dir("sanitize");
        let shops = manager(dir.clone());
        shops.get_or_create("../evil").unwrap();
        assert!(dir.join("evil.wal").exists());

        let err = shops.get_or_create("../..").err().unwrap();
        assert!(err.to_string().contains("empty shop name"));
    }

    #[tokio::test]
    async fn name_too_long() {
        let shops = manager(test_data_dir("too_long"));
        let err = shops
            .get_or_create(&"x".repeat(MAX_SHOP_NAME_LEN + 1))
            .err()
            .unwrap();
        assert!(err.to_string().contains("shop name too long"));
        assert!(shops.get_or_create(&"x".repeat(MAX_SHOP_NAME_LEN)).is_ok());
    }

    #[tokio::test]
    async fn shop_count_limit() {
        let shops = manager(test_data_dir("count_limit")).with_max_shops(8);
        for i in 0..8 {
            shops.get_or_create(&format!("s{i}")).unwrap();
        }
        let err = shops.get_or_create("one_more").err().unwrap();
        assert!(err.to_string().contains("too many shops"));
        assert!(shops.get_or_create("s0").is_ok());
    }

    #[tokio::test]
    async fn existing_shop_replayed_on_open() {
        let dir = test_data_dir("replay");
        let id = Ulid::new();
        {
            let shops = manager(dir.clone());
            let engine = shops.get_or_create("main").unwrap();
            engine.create_barber(id, "Sam".into(), None).await.unwrap();
        }
        let shops = manager(dir);
        let engine = shops.get_or_create("main").unwrap();
        assert_eq!(engine.list_barbers().await[0].id, id);
    }
}

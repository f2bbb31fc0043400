use sc_vendors::{LookupTechs, TechInfo, Vendors, VendorsError, init};
use std::sync::Arc;

#[derive(Debug)]
struct NoTechs;

#[async_trait::async_trait]
impl LookupTechs for NoTechs {
    async fn find_tech(&self, _subject: &str) -> Result<Option<TechInfo>, VendorsError> {
        Ok(None)
    }
}

#[test]
fn init_creates_slice() {
    let slice = init(Arc::new(NoTechs));

    assert_eq!(slice.id, std::any::TypeId::of::<Vendors>());
    assert_eq!(slice.name(), "vendors");
    assert!(slice.downcast::<Vendors>().is_some());
}

//! Where uploaded images live.

use async_trait::async_trait;
use gm_commerce::catalog::{ImageRef, ImageUpload};
use gm_commerce::CommerceError;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Folder an upload is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    /// Category and product images.
    Products,
    /// Case variant images.
    Cases,
}

impl ImageFolder {
    pub fn path(&self) -> &'static str {
        match self {
            ImageFolder::Products => "static/products",
            ImageFolder::Cases => "static/cases",
        }
    }
}

/// Stores image bytes and hands back a reference to them.
///
/// Releasing a reference the store does not know is not an error.
#[async_trait(?Send)]
pub trait ImageStore {
    async fn store(
        &self,
        folder: ImageFolder,
        upload: &ImageUpload,
    ) -> Result<ImageRef, CommerceError>;

    async fn release(&self, image: &ImageRef) -> Result<(), CommerceError>;
}

/// In-process image store.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    next: Cell<u64>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        self.files.borrow().contains_key(image.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

#[async_trait(?Send)]
impl ImageStore for MemoryImageStore {
    async fn store(
        &self,
        folder: ImageFolder,
        upload: &ImageUpload,
    ) -> Result<ImageRef, CommerceError> {
        if upload.bytes.is_empty() {
            return Err(CommerceError::invalid(format!(
                "image {} is empty",
                upload.filename
            )));
        }
        let n = self.next.get() + 1;
        self.next.set(n);
        let name = upload.filename.rsplit(['/', '\\']).next().unwrap_or("image");
        let path = format!("{}/{:08x}_{}", folder.path(), n, name);
        self.files
            .borrow_mut()
            .insert(path.clone(), upload.bytes.clone());
        Ok(ImageRef::new(path))
    }

    async fn release(&self, image: &ImageRef) -> Result<(), CommerceError> {
        self.files.borrow_mut().remove(image.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_release() {
        let store = MemoryImageStore::new();
        let image = store
            .store(ImageFolder::Products, &ImageUpload::new("a/b/red.png", vec![1, 2]))
            .await
            .unwrap();
        assert!(image.as_str().starts_with("static/products/"));
        assert!(image.as_str().ends_with("_red.png"));
        assert!(store.contains(&image));

        store.release(&image).await.unwrap();
        assert!(store.is_empty());
        store.release(&image).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let store = MemoryImageStore::new();
        let err = store
            .store(ImageFolder::Cases, &ImageUpload::new("x.png", Vec::<u8>::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
    }
}

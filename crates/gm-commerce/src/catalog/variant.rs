//! Type variants (`type1`..`type5`) and their images.

use crate::catalog::ImageRef;
use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the five fixed variant slots a product or case offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
}

impl VariantType {
    pub const ALL: [VariantType; 5] = [
        VariantType::Type1,
        VariantType::Type2,
        VariantType::Type3,
        VariantType::Type4,
        VariantType::Type5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Type1 => "type1",
            VariantType::Type2 => "type2",
            VariantType::Type3 => "type3",
            VariantType::Type4 => "type4",
            VariantType::Type5 => "type5",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantType {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CommerceError::invalid(format!("variant type must be type1..type5, got {s:?}"))
            })
    }
}

/// Sparse mapping from variant type to image.
///
/// A missing key means the product has no image for that type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeImages(BTreeMap<VariantType, ImageRef>);

impl TypeImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variant: VariantType) -> Option<&ImageRef> {
        self.0.get(&variant)
    }

    pub fn contains(&self, variant: VariantType) -> bool {
        self.0.contains_key(&variant)
    }

    /// Set the image for `variant`, returning the one it replaces.
    pub fn set(&mut self, variant: VariantType, image: ImageRef) -> Option<ImageRef> {
        self.0.insert(variant, image)
    }

    /// Remove the image for `variant`, returning it.
    pub fn remove(&mut self, variant: VariantType) -> Option<ImageRef> {
        self.0.remove(&variant)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Types that have an image, in type order.
    pub fn types(&self) -> impl Iterator<Item = VariantType> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantType, &ImageRef)> {
        self.0.iter().map(|(t, i)| (*t, i))
    }

    /// The first type that has an image; the default selection in the shop.
    pub fn first_type(&self) -> Option<VariantType> {
        self.0.keys().next().copied()
    }

    /// The listing image: the `type1` image when present.
    pub fn cover(&self) -> Option<&ImageRef> {
        self.get(VariantType::Type1)
    }

    /// Build from raw `type name -> path` pairs.
    ///
    /// Unknown type names are returned separately instead of failing the
    /// whole mapping.
    pub fn from_raw<I, K, V>(raw: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ImageRef>,
    {
        let mut images = TypeImages::new();
        let mut unknown = Vec::new();
        for (key, value) in raw {
            match key.as_ref().parse::<VariantType>() {
                Ok(t) => {
                    images.set(t, value.into());
                }
                Err(_) => unknown.push(key.as_ref().to_string()),
            }
        }
        (images, unknown)
    }

    /// Drain every image, e.g. when the owner is deleted.
    pub fn into_images(self) -> Vec<ImageRef> {
        self.0.into_values().collect()
    }
}

impl FromIterator<(VariantType, ImageRef)> for TypeImages {
    fn from_iter<I: IntoIterator<Item = (VariantType, ImageRef)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

use serde::Deserialize;
use serde_json::Value;

use super::{lossy, malformed, require, with_payload};
use crate::error::Result;
use crate::model::{DocumentId, FileAsset, Image, ImageFormats, ImageVariant};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MediaDto {
    pub id: Option<i64>,
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// The store reports sizes in kilobytes, fractional.
    pub size: Option<f64>,
    pub mime: Option<String>,
    pub ext: Option<String>,
    pub formats: Option<FormatsDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FormatsDto {
    thumbnail: Option<VariantDto>,
    small: Option<VariantDto>,
    medium: Option<VariantDto>,
    large: Option<VariantDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct VariantDto {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl VariantDto {
    fn into_domain(self) -> Option<ImageVariant> {
        Some(ImageVariant {
            url: self.url?,
            width: self.width?,
            height: self.height?,
        })
    }
}

fn size_to_bytes(size_kb: Option<f64>) -> u64 {
    match size_kb {
        Some(kb) if kb.is_finite() && kb > 0.0 => (kb * 1024.0).round() as u64,
        _ => 0,
    }
}

impl MediaDto {
    pub(crate) fn into_image(self) -> Result<Image> {
        Ok(Image {
            id: DocumentId(require("image", "documentId", self.document_id)?),
            row_id: require("image", "id", self.id)?,
            name: require("image", "name", self.name)?,
            url: require("image", "url", self.url)?,
            size_bytes: size_to_bytes(self.size),
            mime: self.mime.unwrap_or_default(),
            formats: self.formats.map(|f| ImageFormats {
                thumbnail: f.thumbnail.and_then(VariantDto::into_domain),
                small: f.small.and_then(VariantDto::into_domain),
                medium: f.medium.and_then(VariantDto::into_domain),
                large: f.large.and_then(VariantDto::into_domain),
            }),
        })
    }

    pub(crate) fn into_file(self) -> Result<FileAsset> {
        Ok(FileAsset {
            id: DocumentId(require("file", "documentId", self.document_id)?),
            row_id: require("file", "id", self.id)?,
            name: require("file", "name", self.name)?,
            url: require("file", "url", self.url)?,
            size_bytes: size_to_bytes(self.size),
            ext: self.ext,
        })
    }
}

pub fn decode_image(raw: &Value) -> Result<Image> {
    let dto: MediaDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed("image", raw, e))?;
    dto.into_image().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_image(raw: &Value) -> Option<Image> {
    lossy("image", decode_image(raw))
}

pub fn decode_file_asset(raw: &Value) -> Result<FileAsset> {
    let dto: MediaDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed("file", raw, e))?;
    dto.into_file().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_file_asset(raw: &Value) -> Option<FileAsset> {
    lossy("file", decode_file_asset(raw))
}

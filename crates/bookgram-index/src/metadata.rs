//! Bibliographic metadata from IIIF presentation manifests.
//!
//! A manifest supplies the label, attribution, license and free-form
//! metadata of a book, plus one image per canvas. Manifests come either
//! over HTTP from a URL template or from a directory of `{bid}.json` files.

use std::{fs, path::PathBuf, time::Duration};

use bookgram_config::MetadataSettings;
use bookgram_document::{BookText, LabelValue, PageOrigin};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::IndexError;

/// Image ids are cut just after this suffix.
const IMAGE_SUFFIX: &str = ".tif";

/// The parts of a manifest a document needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Title.
    pub label: String,
    /// Holding institution.
    pub attribution: String,
    /// License URL.
    pub license: String,
    /// Free-form label/value pairs.
    pub metadata: Vec<LabelValue>,
    /// Image id of each canvas, in canvas order.
    pub images: Vec<String>,
}

impl Manifest {
    /// Parses a IIIF presentation manifest.
    ///
    /// `bid` only names the book in errors.
    pub fn from_json(bid: &str, raw: &[u8]) -> Result<Self, IndexError> {
        let raw: RawManifest = serde_json::from_slice(raw).map_err(|e| IndexError::Metadata {
            bid: bid.to_string(),
            message: format!("response parsing failed: {e}"),
        })?;
        let images = raw
            .sequences
            .into_iter()
            .next()
            .map(|sequence| {
                sequence
                    .canvases
                    .into_iter()
                    .map(|canvas| {
                        canvas
                            .images
                            .into_iter()
                            .next()
                            .map(|image| image_id(&image.resource.id).to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            label: raw.label,
            attribution: raw.attribution,
            license: raw.license,
            metadata: raw.metadata,
            images,
        })
    }

    /// Copies the bibliographic fields into `doc` and picks one image per page.
    ///
    /// `origins` is parallel to `doc.pbs`; each page takes the image of its
    /// source canvas.
    pub fn apply(&self, doc: &mut BookText, origins: &[PageOrigin]) -> Result<(), IndexError> {
        let images = origins
            .iter()
            .map(|origin| {
                origin
                    .canvas
                    .checked_sub(1)
                    .and_then(|at| self.images.get(at))
                    .cloned()
                    .ok_or_else(|| IndexError::MissingCanvas {
                        bid: doc.metadata.bid.clone(),
                        canvas: origin.canvas,
                        available: self.images.len(),
                    })
            })
            .collect::<Result<Vec<_>, IndexError>>()?;
        doc.images = images;
        doc.metadata.label.clone_from(&self.label);
        doc.metadata.attribution.clone_from(&self.attribution);
        doc.metadata.license.clone_from(&self.license);
        doc.metadata.metadata.clone_from(&self.metadata);
        Ok(())
    }
}

/// Cuts `id` just after its first `.tif`, leaving it whole when there is none.
pub fn image_id(id: &str) -> &str {
    match id.find(IMAGE_SUFFIX) {
        Some(at) => &id[..at + IMAGE_SUFFIX.len()],
        None => id,
    }
}

/// Manifest as published.
#[derive(Deserialize)]
struct RawManifest {
    /// Title.
    #[serde(default)]
    label: String,
    /// Holding institution.
    #[serde(default)]
    attribution: String,
    /// License URL.
    #[serde(default)]
    license: String,
    /// Free-form pairs.
    #[serde(default)]
    metadata: Vec<LabelValue>,
    /// Only the first sequence is used.
    #[serde(default)]
    sequences: Vec<RawSequence>,
}

/// One reading sequence.
#[derive(Deserialize)]
struct RawSequence {
    /// Pages.
    #[serde(default)]
    canvases: Vec<RawCanvas>,
}

/// One page.
#[derive(Deserialize)]
struct RawCanvas {
    /// Only the first image is used.
    #[serde(default)]
    images: Vec<RawImage>,
}

/// Image annotation.
#[derive(Deserialize)]
struct RawImage {
    /// The image itself.
    resource: RawResource,
}

/// Image resource.
#[derive(Deserialize)]
struct RawResource {
    /// Image URL.
    #[serde(rename = "@id")]
    id: String,
}

/// Where manifests come from.
pub trait MetadataSource: Send + Sync {
    /// Fetches the manifest of book `bid`.
    fn fetch(&self, bid: &str) -> Result<Manifest, IndexError>;
}

/// Manifests fetched over HTTP.
#[derive(Debug, Clone)]
pub struct HttpManifests {
    /// URL with `{bid}` standing for the book id.
    url_template: String,
    /// Shared blocking client.
    client: Client,
}

impl HttpManifests {
    /// Creates a source for `url_template` with the given request timeout.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Client(e.to_string()))?;
        Ok(Self {
            url_template: url_template.into(),
            client,
        })
    }

    /// URL of the manifest of `bid`.
    pub fn url(&self, bid: &str) -> String {
        self.url_template.replace("{bid}", bid)
    }
}

impl MetadataSource for HttpManifests {
    fn fetch(&self, bid: &str) -> Result<Manifest, IndexError> {
        let url = self.url(bid);
        let failed = |message: String| IndexError::Metadata {
            bid: bid.to_string(),
            message,
        };
        debug!(bid, %url, "fetching manifest");
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(format!("http request failed: {url}: {e}")))?;
        let body = response
            .bytes()
            .map_err(|e| failed(format!("response reading failed: {url}: {e}")))?;
        Manifest::from_json(bid, &body)
    }
}

/// Manifests read from `{dir}/{bid}.json`.
#[derive(Debug, Clone)]
pub struct ManifestDir {
    /// Directory holding the manifests.
    dir: PathBuf,
}

impl ManifestDir {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MetadataSource for ManifestDir {
    fn fetch(&self, bid: &str) -> Result<Manifest, IndexError> {
        let path = self.dir.join(format!("{bid}.json"));
        let raw = fs::read(&path).map_err(|e| IndexError::Metadata {
            bid: bid.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        Manifest::from_json(bid, &raw)
    }
}

/// Picks the manifest source the settings ask for.
pub fn metadata_source(
    settings: &MetadataSettings,
) -> Result<Box<dyn MetadataSource>, IndexError> {
    match &settings.manifest_dir {
        Some(dir) => Ok(Box::new(ManifestDir::new(dir.clone()))),
        None => Ok(Box::new(HttpManifests::new(
            settings.manifest_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?)),
    }
}

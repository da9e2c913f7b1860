//! glTF asset loading
//!
//! Assets are fetched through an [`AssetFetcher`] and parsed into a [`Model`].
//! [`AssetLoader::load`] returns a boxed future so the caller decides where it
//! runs; the viewer spawns it off the UI thread.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::model::{MeshPrimitive, Model, ModelNode};

/// Upper bound for assets fetched over HTTP
const MAX_REMOTE_ASSET_BYTES: u64 = 256 * 1024 * 1024;

/// Location of a model asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReference {
    File(PathBuf),
    Url(String),
}

impl AssetReference {
    /// Interpret `s` as a URL when it has an http(s) scheme, else as a path
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            AssetReference::Url(s.to_string())
        } else {
            AssetReference::File(PathBuf::from(s))
        }
    }

    /// Last path segment without query or fragment
    fn file_name(&self) -> Option<&str> {
        match self {
            AssetReference::File(path) => path.file_name().and_then(|s| s.to_str()),
            AssetReference::Url(url) => strip_query(url).rsplit('/').next(),
        }
    }

    /// Display name (file stem)
    pub fn name(&self) -> String {
        self.file_name()
            .map(Path::new)
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("unnamed")
            .to_string()
    }

    /// Lowercase file extension
    pub fn extension(&self) -> Option<String> {
        self.file_name()
            .map(Path::new)
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
    }

    /// Resolve a URI found inside the asset relative to the asset itself
    pub fn resolve(&self, uri: &str) -> AssetReference {
        if uri.contains("://") {
            return AssetReference::parse(uri);
        }
        match self {
            AssetReference::File(path) => AssetReference::File(
                path.parent()
                    .map(|dir| dir.join(uri))
                    .unwrap_or_else(|| PathBuf::from(uri)),
            ),
            AssetReference::Url(url) => {
                let base = strip_query(url);
                let dir = match base.rfind('/') {
                    Some(idx) => &base[..=idx],
                    None => "",
                };
                AssetReference::Url(format!("{dir}{uri}"))
            }
        }
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetReference::File(path) => write!(f, "{}", path.display()),
            AssetReference::Url(url) => f.write_str(url),
        }
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Container format of a glTF asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// Single-file binary packaging (.glb)
    Binary,
    /// JSON scene description, possibly referencing external buffers (.gltf)
    Json,
}

impl AssetFormat {
    /// Detect from the extension, falling back to sniffing the payload
    pub fn detect(reference: &AssetReference, bytes: &[u8]) -> Result<Self, LoadError> {
        let extension = reference.extension();
        match extension.as_deref() {
            Some("glb") => return Ok(AssetFormat::Binary),
            Some("gltf") => return Ok(AssetFormat::Json),
            _ => {}
        }

        if bytes.starts_with(b"glTF") {
            Ok(AssetFormat::Binary)
        } else if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
            Ok(AssetFormat::Json)
        } else {
            Err(LoadError::UnsupportedFormat(
                extension.unwrap_or_else(|| "unknown".to_string()),
            ))
        }
    }
}

/// Asset loading errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Source of raw asset bytes
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, reference: &AssetReference) -> Result<Vec<u8>, LoadError>;
}

/// Reads files from disk and URLs over HTTP
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFetcher;

impl AssetFetcher for DefaultFetcher {
    fn fetch(&self, reference: &AssetReference) -> Result<Vec<u8>, LoadError> {
        match reference {
            AssetReference::File(path) => {
                std::fs::read(path).map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))
            }
            AssetReference::Url(url) => {
                let mut response = ureq::get(url)
                    .call()
                    .map_err(|e| LoadError::Network(format!("{url}: {e}")))?;
                response
                    .body_mut()
                    .with_config()
                    .limit(MAX_REMOTE_ASSET_BYTES)
                    .read_to_vec()
                    .map_err(|e| LoadError::Network(format!("{url}: {e}")))
            }
        }
    }
}

/// Future resolving to a loaded model
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<Model, LoadError>> + Send>>;

/// Asynchronous model loading capability
pub trait AssetLoader: Send + Sync {
    /// Start loading `reference`. Failures resolve to `Err`, never panic.
    fn load(&self, reference: AssetReference) -> LoadFuture;
}

/// glTF 2.0 loader (.glb and .gltf)
#[derive(Clone)]
pub struct GltfLoader {
    fetcher: Arc<dyn AssetFetcher>,
}

impl GltfLoader {
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(DefaultFetcher))
    }

    pub fn with_fetcher(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { fetcher }
    }
}

impl Default for GltfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for GltfLoader {
    fn load(&self, reference: AssetReference) -> LoadFuture {
        let fetcher = Arc::clone(&self.fetcher);
        Box::pin(async move { load_gltf(fetcher.as_ref(), &reference) })
    }
}

/// Fetch and parse a glTF asset
pub fn load_gltf(
    fetcher: &dyn AssetFetcher,
    reference: &AssetReference,
) -> Result<Model, LoadError> {
    let bytes = fetcher.fetch(reference)?;
    let format = AssetFormat::detect(reference, &bytes)?;
    tracing::debug!("Parsing {:?} asset {} ({} bytes)", format, reference, bytes.len());

    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(&bytes).map_err(|e| LoadError::Parse(e.to_string()))?;
    let buffers = resolve_buffers(fetcher, reference, &document, blob)?;

    let model = build_model(reference.name(), &document, &buffers)?;
    tracing::info!(
        "Loaded model '{}' from {} ({} primitives)",
        model.name,
        reference,
        model.primitive_count()
    );
    Ok(model)
}

/// Load buffer contents: the GLB blob, data URIs, and external files/URLs
fn resolve_buffers(
    fetcher: &dyn AssetFetcher,
    reference: &AssetReference,
    document: &gltf::Document,
    blob: Option<Vec<u8>>,
) -> Result<Vec<gltf::buffer::Data>, LoadError> {
    let has_remote_buffers = document.buffers().any(|b| {
        matches!(b.source(), gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:"))
    });

    match reference {
        AssetReference::Url(_) if has_remote_buffers => {
            let mut blob = blob;
            document
                .buffers()
                .map(|buffer| {
                    let data = match buffer.source() {
                        gltf::buffer::Source::Bin => blob.take().ok_or_else(|| {
                            LoadError::Parse("missing binary chunk".to_string())
                        })?,
                        gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                            return Err(LoadError::UnsupportedFormat(
                                "embedded buffers mixed with remote buffers".to_string(),
                            ));
                        }
                        gltf::buffer::Source::Uri(uri) => {
                            fetcher.fetch(&reference.resolve(uri))?
                        }
                    };
                    if data.len() < buffer.length() {
                        return Err(LoadError::Parse(format!(
                            "buffer {} is {} bytes, expected {}",
                            buffer.index(),
                            data.len(),
                            buffer.length()
                        )));
                    }
                    Ok(gltf::buffer::Data(data))
                })
                .collect()
        }
        AssetReference::Url(_) => gltf::import_buffers(document, None, blob)
            .map_err(|e| LoadError::Parse(e.to_string())),
        AssetReference::File(path) => gltf::import_buffers(document, path.parent(), blob)
            .map_err(|e| LoadError::Io(e.to_string())),
    }
}

fn build_model(
    name: String,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Model, LoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::Parse("asset contains no scene".to_string()))?;

    let mut root = ModelNode::new(scene.name().map(str::to_owned), Mat4::IDENTITY);
    for node in scene.nodes() {
        root.children.push(convert_node(&node, buffers));
    }

    Ok(Model::new(name, root))
}

fn convert_node(node: &gltf::Node, buffers: &[gltf::buffer::Data]) -> ModelNode {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let mut out = ModelNode::new(node.name().map(str::to_owned), local);

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if let Some(converted) = convert_primitive(&primitive, buffers) {
                out.primitives.push(converted);
            }
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, buffers));
    }

    out
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshPrimitive> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::debug!("Skipping {:?} primitive", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        tracing::warn!("Skipping triangle primitive without readable POSITION data");
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    if indices.iter().any(|&i| i as usize >= positions.len()) {
        tracing::warn!("Skipping primitive with out-of-range indices");
        return None;
    }

    let normals = match reader.read_normals() {
        Some(normals) => {
            let normals: Vec<[f32; 3]> = normals.collect();
            if normals.len() == positions.len() {
                normals
            } else {
                vertex_normals(&positions, &indices)
            }
        }
        None => vertex_normals(&positions, &indices),
    };

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Some(MeshPrimitive {
        positions,
        normals,
        indices,
        base_color,
    })
}

/// Smooth per-vertex normals from the area-weighted face normals
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from(positions[a]);
        let p1 = Vec3::from(positions[b]);
        let p2 = Vec3::from(positions[c]);
        let face = (p1 - p0).cross(p2 - p0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

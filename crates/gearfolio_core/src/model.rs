//! Imported glTF models
//!
//! A model is flattened into a list of triangle meshes, each with its
//! accumulated node transform and a metalness/roughness material read from
//! the file. Textures, skins and animations are ignored.

use std::path::Path;

use glam::{Mat4, Vec3};
use gearfolio_geometry::{Aabb, Mesh};
use serde::{Deserialize, Serialize};

use crate::asset_cache::Asset;
use crate::asset_error::AssetError;
use crate::material::{Material, ShadowFlags};

/// One drawable part of a model
#[derive(Clone, Debug)]
pub struct ModelMesh {
    /// Mesh name from the file
    pub name: Option<String>,
    /// Geometry in mesh-local space
    pub mesh: Mesh,
    /// Accumulated node transform (model space)
    pub transform: Mat4,
    /// Surface material
    pub material: Material,
    /// Shadow participation
    pub shadows: ShadowFlags,
}

/// Material and shadow settings forced onto every mesh of a model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialOverride {
    /// Replace the base color
    pub base_color: Option<[f32; 4]>,
    /// Replace metalness
    pub metalness: Option<f32>,
    /// Replace roughness
    pub roughness: Option<f32>,
    /// Force shadow casting on or off
    pub cast_shadow: Option<bool>,
    /// Force shadow receiving on or off
    pub receive_shadow: Option<bool>,
}

impl MaterialOverride {
    /// True when the override changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to one material and its shadow flags
    pub fn apply(&self, material: &mut Material, shadows: &mut ShadowFlags) {
        if let Some(color) = self.base_color {
            material.base_color = color;
        }
        if let Some(metalness) = self.metalness {
            material.metalness = metalness.clamp(0.0, 1.0);
        }
        if let Some(roughness) = self.roughness {
            material.roughness = roughness.clamp(0.0, 1.0);
        }
        if let Some(cast) = self.cast_shadow {
            shadows.set(ShadowFlags::CAST, cast);
        }
        if let Some(receive) = self.receive_shadow {
            shadows.set(ShadowFlags::RECEIVE, receive);
        }
    }
}

/// A model imported from a glTF or GLB file
#[derive(Clone, Debug, Default)]
pub struct ModelAsset {
    /// Drawable parts in traversal order
    pub meshes: Vec<ModelMesh>,
}

impl Asset for ModelAsset {
    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        let (document, buffers, _) = gltf::import(path)?;
        Self::from_document(&document, &buffers, &path.display().to_string())
    }
}

impl ModelAsset {
    /// Import a model from an in-memory glTF/GLB file
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, _) = gltf::import_slice(bytes)?;
        Self::from_document(&document, &buffers, "<memory>")
    }

    fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        source: &str,
    ) -> Result<Self, AssetError> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::Empty(source.to_string()))?;

        let meshes = collect_meshes(document, &scene, buffers)?;
        if meshes.is_empty() {
            return Err(AssetError::Empty(source.to_string()));
        }

        log::info!("Imported {}: {} meshes", source, meshes.len());
        Ok(Self { meshes })
    }

    /// Number of meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Triangles over all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    /// Bounding box in model space
    pub fn bounds(&self) -> Option<Aabb> {
        let mut points = self
            .meshes
            .iter()
            .flat_map(|m| m.mesh.positions.iter().map(move |p| m.transform.transform_point3(*p)));
        let first = points.next()?;
        let mut aabb = Aabb { min: first, max: first };
        for p in points {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Transform that centers the model on the origin and scales its
    /// largest side to `size`
    pub fn fit_transform(&self, size: f32) -> Mat4 {
        let Some(aabb) = self.bounds() else {
            return Mat4::IDENTITY;
        };
        let largest = aabb.extent().max_element();
        let scale = if largest > f32::EPSILON { size / largest } else { 1.0 };
        Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-aabb.center())
    }

    /// Apply a material override to every mesh
    pub fn apply_override(&mut self, overrides: &MaterialOverride) {
        for mesh in &mut self.meshes {
            overrides.apply(&mut mesh.material, &mut mesh.shadows);
        }
    }
}

/// Walk the node tree depth-first, accumulating node transforms
///
/// The node graph must be a tree; a node reached twice (a cycle or a
/// shared child) is rejected.
fn collect_meshes<'a>(
    document: &'a gltf::Document,
    scene: &gltf::Scene<'a>,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<ModelMesh>, AssetError> {
    let mut visited = vec![false; document.nodes().len()];
    let mut stack: Vec<(gltf::Node<'a>, Mat4)> = scene.nodes().map(|node| (node, Mat4::IDENTITY)).collect();
    stack.reverse();
    let mut out = Vec::new();

    while let Some((node, parent)) = stack.pop() {
        let seen = visited.get_mut(node.index()).ok_or_else(|| {
            AssetError::Parse(format!("node {} is out of range", node.index()))
        })?;
        if std::mem::replace(seen, true) {
            return Err(AssetError::Parse(format!(
                "node {} is reached more than once (cyclic node graph)",
                node.index()
            )));
        }

        let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if let Some(geometry) = read_primitive(&primitive, buffers) {
                    let pbr = primitive.material().pbr_metallic_roughness();
                    out.push(ModelMesh {
                        name: mesh.name().map(str::to_owned),
                        mesh: geometry,
                        transform,
                        material: Material {
                            base_color: pbr.base_color_factor(),
                            metalness: pbr.metallic_factor(),
                            roughness: pbr.roughness_factor(),
                        },
                        shadows: ShadowFlags::NONE,
                    });
                }
            }
        }

        let first_child = stack.len();
        stack.extend(node.children().map(|child| (child, transform)));
        stack[first_child..].reverse();
    }
    Ok(out)
}

fn read_primitive(primitive: &gltf::Primitive<'_>, buffers: &[gltf::buffer::Data]) -> Option<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!("Skipping non-triangle primitive ({:?})", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
    let count = positions.len() as u32;

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..count).collect(),
    };
    if indices.len() % 3 != 0 || indices.iter().any(|&i| i >= count) {
        log::warn!("Skipping primitive with invalid indices");
        return None;
    }

    let normals: Option<Vec<Vec3>> = reader
        .read_normals()
        .map(|normals| normals.map(Vec3::from).collect());

    let mut mesh = Mesh {
        normals: Vec::new(),
        positions,
        indices,
    };
    match normals {
        Some(normals) if normals.len() == mesh.positions.len() => mesh.normals = normals,
        _ => mesh.recompute_normals(),
    }
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One red triangle under a node translated by +2 on Z
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0, "translation": [0.0, 0.0, 2.0] } ],
        "meshes": [ { "name": "tri", "primitives": [ { "attributes": { "POSITION": 0 }, "material": 0 } ] } ],
        "materials": [ { "pbrMetallicRoughness": {
            "baseColorFactor": [1.0, 0.0, 0.0, 1.0], "metallicFactor": 0.25, "roughnessFactor": 0.75 } } ],
        "buffers": [ { "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA" } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
        "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] } ]
    }"#;

    #[test]
    fn test_import_triangle() {
        let model = ModelAsset::from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.triangle_count(), 1);

        let part = &model.meshes[0];
        assert_eq!(part.name.as_deref(), Some("tri"));
        assert_eq!(part.material.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(part.material.metalness, 0.25);
        assert_eq!(part.material.roughness, 0.75);
        // Normals were missing and are rebuilt from the winding
        assert!(part.mesh.normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn test_node_transform_is_applied_to_bounds() {
        let model = ModelAsset::from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        let aabb = model.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_fit_transform_centers_and_scales() {
        let model = ModelAsset::from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        let fit = model.fit_transform(4.0);
        let center = fit.transform_point3(Vec3::new(0.5, 0.5, 2.0));
        assert!(center.length() < 1e-6);
        let corner = fit.transform_point3(Vec3::new(1.0, 1.0, 2.0));
        assert!((corner - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_override() {
        let mut model = ModelAsset::from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        let overrides = MaterialOverride {
            metalness: Some(0.9),
            roughness: Some(2.0),
            cast_shadow: Some(true),
            ..Default::default()
        };
        assert!(!overrides.is_empty());
        model.apply_override(&overrides);
        let part = &model.meshes[0];
        assert_eq!(part.material.metalness, 0.9);
        assert_eq!(part.material.roughness, 1.0);
        assert_eq!(part.material.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(part.shadows, ShadowFlags::CAST);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = ModelAsset::from_slice(b"definitely not a model").unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)), "{:?}", err);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ModelAsset::load_from_file(Path::new("/nonexistent/model.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)), "{:?}", err);
    }

    #[test]
    fn test_cyclic_node_graph_is_a_parse_error() {
        let json = TRIANGLE_GLTF.replace(
            r#""nodes": [ { "mesh": 0, "translation": [0.0, 0.0, 2.0] } ]"#,
            r#""nodes": [ { "mesh": 0, "children": [1] }, { "children": [0] } ]"#,
        );
        let err = ModelAsset::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)), "{:?}", err);
    }

    #[test]
    fn test_child_transforms_accumulate() {
        let json = TRIANGLE_GLTF.replace(
            r#""nodes": [ { "mesh": 0, "translation": [0.0, 0.0, 2.0] } ]"#,
            r#""nodes": [ { "translation": [0.0, 0.0, 2.0], "children": [1] },
                          { "mesh": 0, "translation": [3.0, 0.0, 0.0] } ]"#,
        );
        let model = ModelAsset::from_slice(json.as_bytes()).unwrap();
        let aabb = model.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 1.0, 2.0));
    }

    #[test]
    fn test_scene_without_meshes_is_empty() {
        let json = r#"{ "asset": { "version": "2.0" }, "scenes": [ { "nodes": [0] } ], "nodes": [ {} ] }"#;
        let err = ModelAsset::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, AssetError::Empty(_)));
    }
}

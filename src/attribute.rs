//! Attribute alias resolution.
//!
//! PLY producers disagree on property naming (`x` vs `px` vs `posx`,
//! `red` vs `diffuse_red`, ...). Each semantic role is resolved by a
//! first-match scan over an ordered alias list; the lists are plain
//! data so the priority order is explicit.

use std::collections::HashMap;

use crate::{ElementDef, PlyError};

const POSITION_ALIASES: [&[&str]; 3] = [
    &["x", "px", "posx"],
    &["y", "py", "posy"],
    &["z", "pz", "posz"],
];

const NORMAL_ALIASES: [&[&str]; 3] = [
    &["nx", "normalx"],
    &["ny", "normaly"],
    &["nz", "normalz"],
];

const UV_ALIASES: [&[&str]; 2] = [&["s", "u", "tex_u"], &["t", "v", "tex_v"]];

const COLOR_ALIASES: [&[&str]; 3] = [
    &["red", "diffuse_red", "r"],
    &["green", "diffuse_green", "g"],
    &["blue", "diffuse_blue", "b"],
];

const FACE_INDEX_ALIASES: &[&str] = &["vertex_indices", "vertex_index"];

/// How one element's records feed the output mesh. Resolved once per
/// element, before any record is decoded.
#[derive(Debug)]
pub(crate) enum DecodePlan {
    Vertex(VertexPlan),
    /// Property index of the vertex-index list.
    Face { indices: usize },
    /// Decoded for cursor correctness, then discarded.
    Skip,
}

/// Property indices backing each resolved vertex role.
#[derive(Debug)]
pub(crate) struct VertexPlan {
    pub position: [usize; 3],
    pub normal: Option<[usize; 3]>,
    pub uv: Option<[usize; 2]>,
    pub color: Option<[usize; 3]>,
    /// Passthrough channels: (output name, property index).
    pub custom: Vec<(String, usize)>,
}

/// Resolve the decode plan for one element.
///
/// `vertex` elements must resolve all three position components; every
/// other role only gates its own output channel and is emitted only
/// when all of its components resolve.
pub(crate) fn resolve_plan(
    element: &ElementDef,
    custom: &HashMap<String, String>,
) -> Result<DecodePlan, PlyError> {
    match element.name.as_str() {
        "vertex" => resolve_vertex_plan(element, custom).map(DecodePlan::Vertex),
        "face" => Ok(resolve_face_plan(element)),
        _ => Ok(DecodePlan::Skip),
    }
}

fn resolve_vertex_plan(
    element: &ElementDef,
    custom: &HashMap<String, String>,
) -> Result<VertexPlan, PlyError> {
    let position = resolve_role(element, &POSITION_ALIASES)?
        .ok_or_else(|| PlyError::MissingPositionAttribute(element.name.clone()))?;
    let normal = resolve_role(element, &NORMAL_ALIASES)?;
    let uv = resolve_role(element, &UV_ALIASES)?;
    let color = resolve_role(element, &COLOR_ALIASES)?;

    let mut channels: Vec<(String, usize)> = Vec::new();
    for (source, output) in custom {
        if let Some(index) = element.property_index(source) {
            require_scalar(element, index)?;
            channels.push((output.clone(), index));
        }
    }
    channels.sort();

    Ok(VertexPlan {
        position,
        normal,
        uv,
        color,
        custom: channels,
    })
}

fn resolve_face_plan(element: &ElementDef) -> DecodePlan {
    match first_match(element, FACE_INDEX_ALIASES) {
        Some(index) if element.properties[index].is_list() => DecodePlan::Face { indices: index },
        _ => DecodePlan::Skip,
    }
}

/// Resolve all components of one role, or none. Each component takes
/// the first alias that names an existing property.
fn resolve_role<const N: usize>(
    element: &ElementDef,
    aliases: &[&[&str]; N],
) -> Result<Option<[usize; N]>, PlyError> {
    let mut indices = [0usize; N];
    for (slot, component_aliases) in indices.iter_mut().zip(aliases) {
        match first_match(element, component_aliases) {
            Some(index) => *slot = index,
            None => return Ok(None),
        }
    }
    for index in indices {
        require_scalar(element, index)?;
    }
    Ok(Some(indices))
}

fn first_match(element: &ElementDef, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| element.property_index(alias))
}

fn require_scalar(element: &ElementDef, index: usize) -> Result<(), PlyError> {
    if element.properties[index].is_list() {
        return Err(PlyError::ListPropertyOnVertexElement(element.name.clone()));
    }
    Ok(())
}

//! Document intents: every reversible edit as one enum variant
//!
//! Each variant carries its arguments plus the state it memoizes on first
//! execution (captured prior values, touched cells). Composites issue their
//! children through the attach scope on first execution only; redo replays
//! the flattened children, so the guarded blocks never run twice.

use std::collections::HashSet;

use crate::core::types::{Axis, IVec3, LayerId, TextureId, VoxelId};
use crate::document::{Document, Layer, Rgba, TextureAsset, Voxel, FACE_COUNT};
use crate::math::GridBox;

use super::{ActionIntent, AttachScope, Effected};

/// Everything a layer deletion must remember to restore the shell.
#[derive(Clone, Debug)]
pub struct DeletedLayerShell {
    slot: usize,
    name: String,
    visible: bool,
    effected: Vec<IVec3>,
}

/// A reversible document edit.
#[derive(Clone, Debug)]
pub enum VoxelIntent {
    // voxel primitives
    AddVoxel {
        voxel: Voxel,
        inserted: bool,
    },
    RemoveVoxel {
        voxel_id: VoxelId,
        memo: Option<Voxel>,
    },
    SelectVoxel {
        voxel_id: VoxelId,
        selected: bool,
        memo: Option<(bool, IVec3)>,
    },
    AlphaVoxel {
        voxel_id: VoxelId,
        alpha: u8,
        memo: Option<(u8, IVec3)>,
    },

    // voxel composites
    MoveVoxel {
        voxel_id: VoxelId,
        new_pos: IVec3,
        effected: Option<Vec<IVec3>>,
    },
    ColorVoxel {
        voxel_id: VoxelId,
        color: Rgba,
        effected: Option<Vec<IVec3>>,
    },
    TextureVoxel {
        voxel_id: VoxelId,
        face: Option<usize>,
        texture: Option<TextureId>,
        effected: Option<Vec<IVec3>>,
    },
    ClearRange {
        layer_id: LayerId,
        center: IVec3,
        radius: i32,
        effected: Option<Vec<IVec3>>,
    },
    FillRange {
        layer_id: LayerId,
        center: IVec3,
        radius: i32,
        color: Rgba,
        effected: Option<Vec<IVec3>>,
    },
    ClearLayer {
        layer_id: LayerId,
        effected: Option<Vec<IVec3>>,
    },

    // layer commands
    CreateLayer {
        layer_id: LayerId,
        name: String,
    },
    DeleteLayer {
        layer_id: LayerId,
        memo: Option<DeletedLayerShell>,
    },
    RenameLayer {
        layer_id: LayerId,
        name: String,
        memo: Option<String>,
    },
    SelectLayer {
        layer_id: Option<LayerId>,
        memo: Option<Option<LayerId>>,
    },
    LayerVisibility {
        layer_id: LayerId,
        visible: bool,
        memo: Option<(bool, Vec<IVec3>)>,
    },
    MoveLayer {
        layer_id: LayerId,
        up: bool,
        effected: Option<Vec<IVec3>>,
    },
    MergeLayers {
        effected: Option<Vec<IVec3>>,
    },
    Migrate {
        voxels: Vec<Voxel>,
        effected: Option<Vec<IVec3>>,
    },

    // mass commands
    MassAdd {
        voxels: Vec<Voxel>,
        layer_id: Option<LayerId>,
        effected: Option<Vec<IVec3>>,
    },
    MassRemove {
        voxel_ids: Vec<VoxelId>,
        effected: Option<Vec<IVec3>>,
    },
    MassColor {
        voxel_ids: Vec<VoxelId>,
        color: Rgba,
        effected: Option<Vec<IVec3>>,
    },
    MassSelect {
        voxel_ids: Vec<VoxelId>,
        selected: bool,
        effected: Option<Vec<IVec3>>,
    },
    MassTexture {
        voxel_ids: Vec<VoxelId>,
        texture: TextureId,
        effected: Option<Vec<IVec3>>,
    },
    MassMove {
        voxels: Vec<Voxel>,
        offset: IVec3,
        effected: Option<Vec<IVec3>>,
    },
    RotateVoxels {
        voxels: Vec<Voxel>,
        axis: Axis,
        degrees: f32,
        effected: Option<Vec<IVec3>>,
    },
    MirrorVoxels {
        voxels: Vec<Voxel>,
        axis: Axis,
        effected: Option<Vec<IVec3>>,
    },

    // texture commands
    AddTexture {
        texture_id: TextureId,
        asset: TextureAsset,
        recorded: bool,
    },
    RemoveTexture {
        texture_id: TextureId,
        memo: Option<TextureAsset>,
        recorded: bool,
    },
    RemoveUnusedTextures {
        recorded: bool,
    },
    ReplaceTexture {
        texture_id: TextureId,
        asset: TextureAsset,
        memo: Option<TextureAsset>,
    },
    SelectTexture {
        texture_id: Option<TextureId>,
        memo: Option<Option<TextureId>>,
    },
}

impl VoxelIntent {
    pub fn add_voxel(voxel: Voxel) -> Self {
        Self::AddVoxel {
            voxel,
            inserted: false,
        }
    }

    pub fn remove_voxel(voxel_id: VoxelId) -> Self {
        Self::RemoveVoxel {
            voxel_id,
            memo: None,
        }
    }

    pub fn select_voxel(voxel_id: VoxelId, selected: bool) -> Self {
        Self::SelectVoxel {
            voxel_id,
            selected,
            memo: None,
        }
    }

    pub fn alpha_voxel(voxel_id: VoxelId, alpha: u8) -> Self {
        Self::AlphaVoxel {
            voxel_id,
            alpha,
            memo: None,
        }
    }

    pub fn move_voxel(voxel_id: VoxelId, new_pos: IVec3) -> Self {
        Self::MoveVoxel {
            voxel_id,
            new_pos,
            effected: None,
        }
    }

    pub fn color_voxel(voxel_id: VoxelId, color: Rgba) -> Self {
        Self::ColorVoxel {
            voxel_id,
            color,
            effected: None,
        }
    }

    pub fn texture_voxel(voxel_id: VoxelId, face: Option<usize>, texture: Option<TextureId>) -> Self {
        Self::TextureVoxel {
            voxel_id,
            face,
            texture,
            effected: None,
        }
    }

    pub fn clear_range(layer_id: LayerId, center: IVec3, radius: i32) -> Self {
        Self::ClearRange {
            layer_id,
            center,
            radius,
            effected: None,
        }
    }

    pub fn fill_range(layer_id: LayerId, center: IVec3, radius: i32, color: Rgba) -> Self {
        Self::FillRange {
            layer_id,
            center,
            radius,
            color,
            effected: None,
        }
    }

    pub fn clear_layer(layer_id: LayerId) -> Self {
        Self::ClearLayer {
            layer_id,
            effected: None,
        }
    }

    pub fn create_layer(layer_id: LayerId, name: impl Into<String>) -> Self {
        Self::CreateLayer {
            layer_id,
            name: name.into(),
        }
    }

    pub fn delete_layer(layer_id: LayerId) -> Self {
        Self::DeleteLayer {
            layer_id,
            memo: None,
        }
    }

    pub fn rename_layer(layer_id: LayerId, name: impl Into<String>) -> Self {
        Self::RenameLayer {
            layer_id,
            name: name.into(),
            memo: None,
        }
    }

    pub fn select_layer(layer_id: Option<LayerId>) -> Self {
        Self::SelectLayer {
            layer_id,
            memo: None,
        }
    }

    pub fn layer_visibility(layer_id: LayerId, visible: bool) -> Self {
        Self::LayerVisibility {
            layer_id,
            visible,
            memo: None,
        }
    }

    pub fn move_layer(layer_id: LayerId, up: bool) -> Self {
        Self::MoveLayer {
            layer_id,
            up,
            effected: None,
        }
    }

    pub fn merge_layers() -> Self {
        Self::MergeLayers { effected: None }
    }

    pub fn migrate(voxels: Vec<Voxel>) -> Self {
        Self::Migrate {
            voxels,
            effected: None,
        }
    }

    pub fn mass_add(voxels: Vec<Voxel>, layer_id: Option<LayerId>) -> Self {
        Self::MassAdd {
            voxels,
            layer_id,
            effected: None,
        }
    }

    pub fn mass_remove(voxel_ids: Vec<VoxelId>) -> Self {
        Self::MassRemove {
            voxel_ids,
            effected: None,
        }
    }

    pub fn mass_color(voxel_ids: Vec<VoxelId>, color: Rgba) -> Self {
        Self::MassColor {
            voxel_ids,
            color,
            effected: None,
        }
    }

    pub fn mass_select(voxel_ids: Vec<VoxelId>, selected: bool) -> Self {
        Self::MassSelect {
            voxel_ids,
            selected,
            effected: None,
        }
    }

    pub fn mass_texture(voxel_ids: Vec<VoxelId>, texture: TextureId) -> Self {
        Self::MassTexture {
            voxel_ids,
            texture,
            effected: None,
        }
    }

    pub fn mass_move(voxels: Vec<Voxel>, offset: IVec3) -> Self {
        Self::MassMove {
            voxels,
            offset,
            effected: None,
        }
    }

    pub fn rotate_voxels(voxels: Vec<Voxel>, axis: Axis, degrees: f32) -> Self {
        Self::RotateVoxels {
            voxels,
            axis,
            degrees,
            effected: None,
        }
    }

    pub fn mirror_voxels(voxels: Vec<Voxel>, axis: Axis) -> Self {
        Self::MirrorVoxels {
            voxels,
            axis,
            effected: None,
        }
    }

    pub fn add_texture(texture_id: TextureId, asset: TextureAsset) -> Self {
        Self::AddTexture {
            texture_id,
            asset,
            recorded: false,
        }
    }

    pub fn remove_texture(texture_id: TextureId) -> Self {
        Self::RemoveTexture {
            texture_id,
            memo: None,
            recorded: false,
        }
    }

    pub fn remove_unused_textures() -> Self {
        Self::RemoveUnusedTextures { recorded: false }
    }

    pub fn replace_texture(texture_id: TextureId, asset: TextureAsset) -> Self {
        Self::ReplaceTexture {
            texture_id,
            asset,
            memo: None,
        }
    }

    pub fn select_texture(texture_id: Option<TextureId>) -> Self {
        Self::SelectTexture {
            texture_id,
            memo: None,
        }
    }
}

type Scope<'a> = AttachScope<'a, Document, VoxelIntent>;

/// Mass-remove the given voxels, evict whatever occupies each transformed
/// destination, then mass-add the transformed records. Shared backbone of
/// move, rotate and mirror. Returns the union of old and new positions.
fn displace(
    store: &mut Document,
    scope: &mut Scope<'_>,
    voxels: &[Voxel],
    map: impl Fn(IVec3) -> IVec3,
) -> Vec<IVec3> {
    let ids: Vec<VoxelId> = voxels.iter().map(|v| v.id).collect();
    scope.attach(store, VoxelIntent::mass_remove(ids));

    let mut effected = Vec::with_capacity(voxels.len() * 2);
    let mut moved = Vec::with_capacity(voxels.len());
    for voxel in voxels {
        let new_pos = map(voxel.position);
        effected.push(voxel.position);
        effected.push(new_pos);
        if let Some(occupant) = store
            .layer(voxel.layer)
            .and_then(|layer| layer.voxel_at(new_pos))
        {
            scope.attach(store, VoxelIntent::remove_voxel(occupant));
        }
        moved.push(voxel.at(new_pos));
    }
    scope.attach(store, VoxelIntent::mass_add(moved, None));
    effected
}

/// Positions of the given voxel ids, skipping unknown ids. Mass intents
/// report these as their touched cells; duplicates are fine.
fn positions_of(store: &Document, ids: &[VoxelId]) -> Vec<IVec3> {
    ids.iter()
        .filter_map(|id| store.voxel(*id).map(|v| v.position))
        .collect()
}

/// Round with .5 going toward positive infinity, so symmetric pairs around
/// a between-cells midpoint land on adjacent cells instead of leaving a gap.
fn round_cell(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Zero out the ~1e-16 trig residue left at cardinal angles; it is enough
/// to tip a half-cell midpoint into the wrong cell when rounding.
fn snap(v: f64) -> f64 {
    if v.abs() < 1e-9 { 0.0 } else { v }
}

impl ActionIntent<Document> for VoxelIntent {
    fn forward(&mut self, store: &mut Document, scope: &mut Scope<'_>) {
        match self {
            VoxelIntent::AddVoxel { voxel, inserted } => {
                *inserted = store.insert_voxel(voxel.clone());
                if !*inserted {
                    log::debug!("add skipped, cell occupied or layer missing: {:?}", voxel.position);
                }
            }

            VoxelIntent::RemoveVoxel { voxel_id, memo } => {
                let taken = store.extract_voxel(*voxel_id);
                if memo.is_none() {
                    if taken.is_none() {
                        log::warn!("remove of unknown voxel {voxel_id:?}");
                    }
                    *memo = taken;
                }
            }

            VoxelIntent::SelectVoxel {
                voxel_id,
                selected,
                memo,
            } => {
                if let Some(voxel) = store.voxels.get_mut(voxel_id) {
                    if memo.is_none() {
                        *memo = Some((voxel.selected, voxel.position));
                    }
                    voxel.selected = *selected;
                } else {
                    log::warn!("select of unknown voxel {voxel_id:?}");
                }
            }

            VoxelIntent::AlphaVoxel {
                voxel_id,
                alpha,
                memo,
            } => {
                if let Some(voxel) = store.voxels.get_mut(voxel_id) {
                    if memo.is_none() {
                        *memo = Some((voxel.color.a, voxel.position));
                    }
                    voxel.color.a = *alpha;
                } else {
                    log::warn!("alpha change of unknown voxel {voxel_id:?}");
                }
            }

            VoxelIntent::MoveVoxel {
                voxel_id,
                new_pos,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let Some(voxel) = store.voxel(*voxel_id).cloned() else {
                    *effected = Some(Vec::new());
                    return;
                };
                scope.attach(store, VoxelIntent::remove_voxel(*voxel_id));
                if let Some(occupant) = store
                    .layer(voxel.layer)
                    .and_then(|layer| layer.voxel_at(*new_pos))
                {
                    scope.attach(store, VoxelIntent::remove_voxel(occupant));
                }
                scope.attach(store, VoxelIntent::add_voxel(voxel.at(*new_pos)));
                *effected = Some(vec![voxel.position, *new_pos]);
            }

            VoxelIntent::ColorVoxel {
                voxel_id,
                color,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let Some(voxel) = store.voxel(*voxel_id).cloned() else {
                    *effected = Some(Vec::new());
                    return;
                };
                scope.attach(store, VoxelIntent::remove_voxel(*voxel_id));
                // a recolor always drops the texture
                scope.attach(
                    store,
                    VoxelIntent::add_voxel(Voxel {
                        color: *color,
                        texture: None,
                        ..voxel.clone()
                    }),
                );
                *effected = Some(vec![voxel.position]);
            }

            VoxelIntent::TextureVoxel {
                voxel_id,
                face,
                texture,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let Some(voxel) = store.voxel(*voxel_id).cloned() else {
                    *effected = Some(Vec::new());
                    return;
                };
                let faces = match texture {
                    None => None,
                    Some(id) => Some(match (voxel.texture, *face) {
                        (Some(mut faces), Some(side)) if side < FACE_COUNT => {
                            faces[side] = *id;
                            faces
                        }
                        _ => [*id; FACE_COUNT],
                    }),
                };
                scope.attach(store, VoxelIntent::remove_voxel(*voxel_id));
                scope.attach(
                    store,
                    VoxelIntent::add_voxel(Voxel {
                        texture: faces,
                        ..voxel.clone()
                    }),
                );
                *effected = Some(vec![voxel.position]);
            }

            VoxelIntent::ClearRange {
                layer_id,
                center,
                radius,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let hits = store
                    .layer(*layer_id)
                    .map(|layer| layer.search(*center, *radius))
                    .unwrap_or_default();
                let mut eff = Vec::with_capacity(hits.len());
                for (pos, id) in hits {
                    eff.push(pos);
                    scope.attach(store, VoxelIntent::remove_voxel(id));
                }
                *effected = Some(eff);
            }

            VoxelIntent::FillRange {
                layer_id,
                center,
                radius,
                color,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let b = GridBox::cube(*center, *radius);
                let mut eff = Vec::new();
                for x in b.min.x..=b.max.x {
                    for y in b.min.y..=b.max.y {
                        for z in b.min.z..=b.max.z {
                            let pos = IVec3::new(x, y, z);
                            if store.position_free(*layer_id, pos) {
                                let id = store.allocate_voxel_id();
                                scope.attach(
                                    store,
                                    VoxelIntent::add_voxel(Voxel::new(id, pos, *color, *layer_id)),
                                );
                                eff.push(pos);
                            }
                        }
                    }
                }
                *effected = Some(eff);
            }

            VoxelIntent::ClearLayer { layer_id, effected } => {
                if effected.is_some() {
                    return;
                }
                let members: Vec<(IVec3, VoxelId)> = store
                    .layer(*layer_id)
                    .map(|layer| layer.iter().collect())
                    .unwrap_or_default();
                let mut eff = Vec::with_capacity(members.len());
                for (pos, id) in members {
                    eff.push(pos);
                    scope.attach(store, VoxelIntent::remove_voxel(id));
                }
                *effected = Some(eff);
            }

            VoxelIntent::CreateLayer { layer_id, name } => {
                let capacity = store.config.max_voxels_per_layer;
                store
                    .layers
                    .insert(*layer_id, Layer::new(*layer_id, name.clone(), capacity));
                store.layer_order.insert(0, *layer_id);
            }

            VoxelIntent::DeleteLayer { layer_id, memo } => {
                if memo.is_none() {
                    let members: Vec<(IVec3, VoxelId)> = store
                        .layer(*layer_id)
                        .map(|layer| layer.iter().collect())
                        .unwrap_or_default();
                    let mut effected = Vec::with_capacity(members.len());
                    for (pos, id) in members {
                        effected.push(pos);
                        scope.attach(store, VoxelIntent::remove_voxel(id));
                    }
                    let slot = store
                        .layer_order
                        .iter()
                        .position(|l| l == layer_id)
                        .unwrap_or(0);
                    let (name, visible) = store
                        .layer(*layer_id)
                        .map(|layer| (layer.name().to_string(), layer.visible()))
                        .unwrap_or_default();
                    *memo = Some(DeletedLayerShell {
                        slot,
                        name,
                        visible,
                        effected,
                    });
                }
                store.layers.remove(layer_id);
                store.layer_order.retain(|l| l != layer_id);
            }

            VoxelIntent::RenameLayer {
                layer_id,
                name,
                memo,
            } => {
                if let Some(layer) = store.layer_mut(*layer_id) {
                    if memo.is_none() {
                        *memo = Some(layer.name().to_string());
                    }
                    layer.set_name(name.clone());
                } else {
                    log::warn!("rename of unknown layer {layer_id:?}");
                }
            }

            VoxelIntent::SelectLayer { layer_id, memo } => {
                if memo.is_none() {
                    *memo = Some(store.selected_layer);
                }
                store.selected_layer = *layer_id;
            }

            VoxelIntent::LayerVisibility {
                layer_id,
                visible,
                memo,
            } => {
                if memo.is_none() {
                    let positions = store
                        .layer(*layer_id)
                        .map(|layer| layer.iter().map(|(pos, _)| pos).collect())
                        .unwrap_or_default();
                    let old = store
                        .layer(*layer_id)
                        .map(|layer| layer.visible())
                        .unwrap_or(true);
                    *memo = Some((old, positions));
                }
                if let Some(layer) = store.layer_mut(*layer_id) {
                    layer.set_visible(*visible);
                }
            }

            VoxelIntent::MoveLayer {
                layer_id,
                up,
                effected,
            } => {
                if effected.is_none() {
                    let positions = store
                        .layer(*layer_id)
                        .map(|layer| layer.iter().map(|(pos, _)| pos).collect())
                        .unwrap_or_default();
                    *effected = Some(positions);
                }
                swap_order(store, *layer_id, *up);
            }

            VoxelIntent::MergeLayers { effected } => {
                if effected.is_some() {
                    return;
                }
                let merged_id = store.allocate_layer_id();
                scope.attach(store, VoxelIntent::create_layer(merged_id, "Merged"));

                let order: Vec<LayerId> = store.layer_order.clone();
                let mut eff = Vec::new();
                // walk top to bottom; the first voxel to claim a cell wins
                for layer_id in &order {
                    if *layer_id == merged_id {
                        continue;
                    }
                    let visible = store
                        .layer(*layer_id)
                        .map(|layer| layer.visible())
                        .unwrap_or(false);
                    if !visible {
                        continue;
                    }
                    for voxel in store.layer_voxels(*layer_id) {
                        if store.position_free(merged_id, voxel.position) {
                            eff.push(voxel.position);
                            let id = store.allocate_voxel_id();
                            scope.attach(
                                store,
                                VoxelIntent::add_voxel(Voxel {
                                    id,
                                    layer: merged_id,
                                    ..voxel
                                }),
                            );
                        }
                    }
                }
                for layer_id in order {
                    let visible = store
                        .layer(layer_id)
                        .map(|layer| layer.visible())
                        .unwrap_or(false);
                    if layer_id != merged_id && visible {
                        scope.attach(store, VoxelIntent::delete_layer(layer_id));
                    }
                }
                scope.attach(store, VoxelIntent::select_layer(Some(merged_id)));
                *effected = Some(eff);
            }

            VoxelIntent::Migrate { voxels, effected } => {
                if effected.is_some() {
                    return;
                }
                let layer_id = store.allocate_layer_id();
                scope.attach(store, VoxelIntent::create_layer(layer_id, "Migrated"));
                let ids: Vec<VoxelId> = voxels.iter().map(|v| v.id).collect();
                let eff: Vec<IVec3> = voxels.iter().map(|v| v.position).collect();
                scope.attach(store, VoxelIntent::mass_remove(ids));
                scope.attach(store, VoxelIntent::mass_add(voxels.clone(), Some(layer_id)));
                scope.attach(store, VoxelIntent::select_layer(Some(layer_id)));
                *effected = Some(eff);
            }

            VoxelIntent::MassAdd {
                voxels,
                layer_id,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let eff: Vec<IVec3> = voxels.iter().map(|v| v.position).collect();
                for record in voxels.clone() {
                    let id = store.allocate_voxel_id();
                    let layer = layer_id.unwrap_or(record.layer);
                    scope.attach(
                        store,
                        VoxelIntent::add_voxel(Voxel {
                            id,
                            layer,
                            ..record
                        }),
                    );
                }
                *effected = Some(eff);
            }

            VoxelIntent::MassRemove {
                voxel_ids,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                *effected = Some(positions_of(store, voxel_ids));
                for id in voxel_ids.clone() {
                    scope.attach(store, VoxelIntent::remove_voxel(id));
                }
            }

            VoxelIntent::MassColor {
                voxel_ids,
                color,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                *effected = Some(positions_of(store, voxel_ids));
                for id in voxel_ids.clone() {
                    scope.attach(store, VoxelIntent::color_voxel(id, *color));
                }
            }

            VoxelIntent::MassSelect {
                voxel_ids,
                selected,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                *effected = Some(positions_of(store, voxel_ids));
                for id in voxel_ids.clone() {
                    scope.attach(store, VoxelIntent::select_voxel(id, *selected));
                }
            }

            VoxelIntent::MassTexture {
                voxel_ids,
                texture,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                *effected = Some(positions_of(store, voxel_ids));
                for id in voxel_ids.clone() {
                    scope.attach(store, VoxelIntent::texture_voxel(id, None, Some(*texture)));
                }
            }

            VoxelIntent::MassMove {
                voxels,
                offset,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let offset = *offset;
                let records = voxels.clone();
                *effected = Some(displace(store, scope, &records, |pos| pos + offset));
            }

            VoxelIntent::RotateVoxels {
                voxels,
                axis,
                degrees,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let Some(bounds) = GridBox::bounding(voxels.iter().map(|v| v.position)) else {
                    *effected = Some(Vec::new());
                    return;
                };
                let mid = bounds.midpoint();
                let (i, j) = axis.others();
                let (sin, cos) = (*degrees as f64).to_radians().sin_cos();
                let (sin, cos) = (snap(sin), snap(cos));
                let records = voxels.clone();
                *effected = Some(displace(store, scope, &records, |pos| {
                    let a = pos[i] as f64 - mid[i];
                    let b = pos[j] as f64 - mid[j];
                    let mut out = pos;
                    out[i] = round_cell(mid[i] + a * cos - b * sin);
                    out[j] = round_cell(mid[j] + a * sin + b * cos);
                    out
                }));
            }

            VoxelIntent::MirrorVoxels {
                voxels,
                axis,
                effected,
            } => {
                if effected.is_some() {
                    return;
                }
                let Some(bounds) = GridBox::bounding(voxels.iter().map(|v| v.position)) else {
                    *effected = Some(Vec::new());
                    return;
                };
                let mid = bounds.midpoint();
                let k = axis.index();
                let records = voxels.clone();
                *effected = Some(displace(store, scope, &records, |pos| {
                    let mut out = pos;
                    out[k] = round_cell(-(pos[k] as f64) + 2.0 * mid[k]);
                    out
                }));
            }

            VoxelIntent::AddTexture {
                texture_id,
                asset,
                recorded,
            } => {
                store.textures.insert(*texture_id, asset.clone());
                if !*recorded {
                    *recorded = true;
                    scope.attach(store, VoxelIntent::select_texture(Some(*texture_id)));
                }
            }

            VoxelIntent::RemoveTexture {
                texture_id,
                memo,
                recorded,
            } => {
                if !*recorded {
                    *recorded = true;
                    if store.selected_texture == Some(*texture_id) {
                        scope.attach(store, VoxelIntent::select_texture(None));
                    }
                }
                let taken = store.textures.remove(texture_id);
                if memo.is_none() {
                    *memo = taken;
                }
            }

            VoxelIntent::RemoveUnusedTextures { recorded } => {
                if *recorded {
                    return;
                }
                *recorded = true;
                let mut referenced: HashSet<TextureId> = HashSet::new();
                for voxel in store.voxels.values() {
                    if let Some(faces) = voxel.texture {
                        referenced.extend(faces);
                    }
                }
                let mut unused: Vec<TextureId> = store
                    .textures
                    .keys()
                    .filter(|id| !referenced.contains(id))
                    .copied()
                    .collect();
                unused.sort();
                if let Some(selected) = store.selected_texture {
                    if unused.contains(&selected) {
                        scope.attach(store, VoxelIntent::select_texture(None));
                    }
                }
                for id in unused {
                    scope.attach(store, VoxelIntent::remove_texture(id));
                }
            }

            VoxelIntent::ReplaceTexture {
                texture_id,
                asset,
                memo,
            } => {
                if memo.is_none() {
                    *memo = store.textures.get(texture_id).cloned();
                }
                store.textures.insert(*texture_id, asset.clone());
            }

            VoxelIntent::SelectTexture { texture_id, memo } => {
                if memo.is_none() {
                    *memo = Some(store.selected_texture);
                }
                store.selected_texture = *texture_id;
            }
        }
    }

    fn inverse(&mut self, store: &mut Document) {
        match self {
            VoxelIntent::AddVoxel { voxel, inserted } => {
                if *inserted {
                    store.extract_voxel(voxel.id);
                }
            }

            VoxelIntent::RemoveVoxel { memo, .. } => {
                if let Some(voxel) = memo.clone() {
                    store.insert_voxel(voxel);
                }
            }

            VoxelIntent::SelectVoxel { voxel_id, memo, .. } => {
                if let Some((old, _)) = memo {
                    if let Some(voxel) = store.voxels.get_mut(voxel_id) {
                        voxel.selected = *old;
                    }
                }
            }

            VoxelIntent::AlphaVoxel { voxel_id, memo, .. } => {
                if let Some((old, _)) = memo {
                    if let Some(voxel) = store.voxels.get_mut(voxel_id) {
                        voxel.color.a = *old;
                    }
                }
            }

            // composites are fully reversed through their children
            VoxelIntent::MoveVoxel { .. }
            | VoxelIntent::ColorVoxel { .. }
            | VoxelIntent::TextureVoxel { .. }
            | VoxelIntent::ClearRange { .. }
            | VoxelIntent::FillRange { .. }
            | VoxelIntent::ClearLayer { .. }
            | VoxelIntent::MergeLayers { .. }
            | VoxelIntent::Migrate { .. }
            | VoxelIntent::MassAdd { .. }
            | VoxelIntent::MassRemove { .. }
            | VoxelIntent::MassColor { .. }
            | VoxelIntent::MassSelect { .. }
            | VoxelIntent::MassTexture { .. }
            | VoxelIntent::MassMove { .. }
            | VoxelIntent::RotateVoxels { .. }
            | VoxelIntent::MirrorVoxels { .. }
            | VoxelIntent::RemoveUnusedTextures { .. } => {}

            VoxelIntent::CreateLayer { layer_id, .. } => {
                store.layers.remove(layer_id);
                store.layer_order.retain(|l| l != layer_id);
            }

            VoxelIntent::DeleteLayer { layer_id, memo } => {
                if let Some(shell) = memo {
                    let capacity = store.config.max_voxels_per_layer;
                    let mut layer = Layer::new(*layer_id, shell.name.clone(), capacity);
                    layer.set_visible(shell.visible);
                    store.layers.insert(*layer_id, layer);
                    let slot = shell.slot.min(store.layer_order.len());
                    store.layer_order.insert(slot, *layer_id);
                }
            }

            VoxelIntent::RenameLayer { layer_id, memo, .. } => {
                if let (Some(old), Some(layer)) = (memo.clone(), store.layer_mut(*layer_id)) {
                    layer.set_name(old);
                }
            }

            VoxelIntent::SelectLayer { memo, .. } => {
                if let Some(old) = memo {
                    store.selected_layer = *old;
                }
            }

            VoxelIntent::LayerVisibility { layer_id, memo, .. } => {
                if let Some((old, _)) = memo {
                    if let Some(layer) = store.layer_mut(*layer_id) {
                        layer.set_visible(*old);
                    }
                }
            }

            VoxelIntent::MoveLayer { layer_id, up, .. } => {
                swap_order(store, *layer_id, !*up);
            }

            VoxelIntent::AddTexture { texture_id, .. } => {
                store.textures.remove(texture_id);
            }

            VoxelIntent::RemoveTexture {
                texture_id, memo, ..
            } => {
                if let Some(asset) = memo.clone() {
                    store.textures.insert(*texture_id, asset);
                }
            }

            VoxelIntent::ReplaceTexture {
                texture_id, memo, ..
            } => {
                if let Some(asset) = memo.clone() {
                    store.textures.insert(*texture_id, asset);
                }
            }

            VoxelIntent::SelectTexture { memo, .. } => {
                if let Some(old) = memo {
                    store.selected_texture = *old;
                }
            }
        }
    }

    fn effected(&self) -> Effected {
        match self {
            VoxelIntent::AddVoxel { voxel, .. } => Effected::Positions(vec![voxel.position]),
            VoxelIntent::RemoveVoxel { memo, .. } => Effected::Positions(
                memo.as_ref().map(|v| vec![v.position]).unwrap_or_default(),
            ),
            VoxelIntent::SelectVoxel { memo, .. } => {
                Effected::Positions(memo.map(|(_, pos)| vec![pos]).unwrap_or_default())
            }
            VoxelIntent::AlphaVoxel { memo, .. } => {
                Effected::Positions(memo.map(|(_, pos)| vec![pos]).unwrap_or_default())
            }

            VoxelIntent::MoveVoxel { effected, .. }
            | VoxelIntent::ColorVoxel { effected, .. }
            | VoxelIntent::TextureVoxel { effected, .. }
            | VoxelIntent::ClearRange { effected, .. }
            | VoxelIntent::FillRange { effected, .. }
            | VoxelIntent::ClearLayer { effected, .. }
            | VoxelIntent::MoveLayer { effected, .. }
            | VoxelIntent::MergeLayers { effected }
            | VoxelIntent::Migrate { effected, .. }
            | VoxelIntent::MassAdd { effected, .. }
            | VoxelIntent::MassRemove { effected, .. }
            | VoxelIntent::MassColor { effected, .. }
            | VoxelIntent::MassSelect { effected, .. }
            | VoxelIntent::MassTexture { effected, .. }
            | VoxelIntent::MassMove { effected, .. }
            | VoxelIntent::RotateVoxels { effected, .. }
            | VoxelIntent::MirrorVoxels { effected, .. } => {
                Effected::Positions(effected.clone().unwrap_or_default())
            }

            VoxelIntent::DeleteLayer { memo, .. } => Effected::Positions(
                memo.as_ref().map(|m| m.effected.clone()).unwrap_or_default(),
            ),
            VoxelIntent::LayerVisibility { memo, .. } => Effected::Positions(
                memo.as_ref().map(|(_, eff)| eff.clone()).unwrap_or_default(),
            ),

            VoxelIntent::CreateLayer { .. }
            | VoxelIntent::RenameLayer { .. }
            | VoxelIntent::SelectLayer { .. }
            | VoxelIntent::AddTexture { .. }
            | VoxelIntent::RemoveTexture { .. }
            | VoxelIntent::RemoveUnusedTextures { .. }
            | VoxelIntent::ReplaceTexture { .. }
            | VoxelIntent::SelectTexture { .. } => Effected::None,
        }
    }

    fn affects_texture(&self) -> bool {
        matches!(
            self,
            VoxelIntent::AddTexture { .. }
                | VoxelIntent::RemoveTexture { .. }
                | VoxelIntent::RemoveUnusedTextures { .. }
                | VoxelIntent::ReplaceTexture { .. }
                | VoxelIntent::SelectTexture { .. }
        )
    }
}

/// Swap a layer with its neighbor above (`up`) or below in the paint order.
fn swap_order(store: &mut Document, layer_id: LayerId, up: bool) {
    let Some(index) = store.layer_order.iter().position(|l| *l == layer_id) else {
        log::warn!("reorder of unknown layer {layer_id:?}");
        return;
    };
    let other = if up {
        index.checked_sub(1)
    } else {
        (index + 1 < store.layer_order.len()).then_some(index + 1)
    };
    match other {
        Some(other) => store.layer_order.swap(index, other),
        None => log::warn!("reorder of {layer_id:?} past the end of the order"),
    }
}

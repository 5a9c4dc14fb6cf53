//! Error types for database construction and queries.

use arcstr::ArcStr;

use crate::layer::{LayerId, LayerKind};
use crate::net::NetId;
use crate::pin::PinId;

/// A result type returning database errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Contract violations detected by the database.
///
/// None of these are expected during correct use; they are reported
/// instead of returning a plausible but wrong answer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A layer index beyond the end of the layer registry.
    #[error("layer {layer} out of range ({num_layers} layers registered)")]
    LayerOutOfRange {
        /// The offending global layer index.
        layer: usize,
        /// The number of registered layers.
        num_layers: usize,
    },
    /// An operation that requires a layer of one kind received another.
    #[error("layer {layer:?} is a {found:?} layer, expected a {expected:?} layer")]
    WrongLayerKind {
        /// The offending layer.
        layer: LayerId,
        /// The kind the operation requires.
        expected: LayerKind,
        /// The kind of `layer`.
        found: LayerKind,
    },
    /// A name was registered twice in a table with unique names.
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName {
        /// The kind of entity.
        kind: &'static str,
        /// The duplicated name.
        name: ArcStr,
    },
    /// A name lookup found nothing.
    #[error("no {kind} named `{name}`")]
    NotFound {
        /// The kind of entity.
        kind: &'static str,
        /// The name that was looked up.
        name: ArcStr,
    },
    /// An id that does not belong to this database.
    #[error("{kind} id {index} out of range ({len} entries)")]
    IdOutOfRange {
        /// The kind of entity.
        kind: &'static str,
        /// The offending index.
        index: usize,
        /// The number of entries in the table.
        len: usize,
    },
    /// A net referenced a pin that already belongs to another net.
    #[error("pin {pin:?} already belongs to net {owner:?}")]
    PinAlreadyOwned {
        /// The pin.
        pin: PinId,
        /// The net that owns the pin.
        owner: NetId,
    },
    /// An argument that violates the operation's preconditions.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A spatial query was issued before the spatial indexes were built.
    #[error("spatial indexes have not been built")]
    SpatialNotBuilt,
    /// A routing guide operation that requires an initialized guide.
    #[error("routing guide is not initialized")]
    GuideNotInitialized,
    /// A guide grid cell outside the guide's dimensions.
    #[error("guide cell ({x}, {y}) out of bounds for a {num_x}x{num_y} guide")]
    GuideCellOutOfBounds {
        /// The x index.
        x: usize,
        /// The y index.
        y: usize,
        /// The number of cells in x.
        num_x: usize,
        /// The number of cells in y.
        num_y: usize,
    },
    /// A probability outside `[0, max_range]`.
    #[error("guide value {value} outside [0, {max_range}]")]
    GuideValueOutOfRange {
        /// The offending value.
        value: i64,
        /// The guide's maximum probability value.
        max_range: i64,
    },
    /// A guide whose dimensions differ from the dimensions already in use.
    #[error(
        "guide dimensions {found:?} do not match the initialized dimensions {expected:?} \
         (num_x, num_y, max_range)"
    )]
    GuideDimensionMismatch {
        /// The dimensions of the initialized guide.
        expected: (usize, usize, i64),
        /// The dimensions supplied.
        found: (usize, usize, i64),
    },
}

mod entity;
mod facet;
mod item;

pub(crate) use self::entity::{AuthorRow, SeriesRow};
pub(crate) use self::item::ItemRow;

//! Category (type) relation data for the advantage table.

use crate::data::source::PokemonSource;
use crate::tournament::{CategoryRelations, TypeAdvantageTable};

/// Raw relation data from `source`. A failure to load the category index is
/// logged and yields an empty list: every type then has no advantages.
pub fn fetch_category_table_source(source: &dyn PokemonSource) -> Vec<CategoryRelations> {
    match source.category_relations() {
        Ok(relations) => {
            let malformed = relations.iter().filter(|r| r.double_damage_to.is_none()).count();
            if malformed > 0 {
                tracing::warn!(malformed, "categories without damage relations will have no advantages");
            }
            relations
        }
        Err(err) => {
            tracing::warn!(error = %err, source = %source.describe(), "failed to load type advantages");
            Vec::new()
        }
    }
}

pub fn load_advantage_table(source: &dyn PokemonSource) -> TypeAdvantageTable {
    let table = TypeAdvantageTable::build(&fetch_category_table_source(source));
    tracing::info!(categories = table.len(), "type advantage table built");
    table
}

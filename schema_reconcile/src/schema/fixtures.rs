//! Shared test schemas
//!
//! Source side: Singers(t1), Albums(t2), Songs(t3), Legacy(t4).
//! Target side: Singers with a renamed and an added column, Albums interleaved
//! in Singers, Songs interleaved in Albums, Legacy dropped, two sequences.

use indexmap::IndexMap;

use crate::schema::store::SchemaSnapshot;
use crate::schema::types::{
    CheckConstraint, Column, DatabaseSchema, ForeignKey, Index, Rating, Sequence, Table,
};

fn singers(target: bool) -> Table {
    let mut table = Table::new("t1", "Singers");
    table.add_column(Column::new("c1", "SingerId", "INT64").not_null(true));
    if target {
        table.add_column(Column::new("c2", "GivenName", "STRING").length(1024));
    } else {
        table.add_column(Column::new("c2", "FirstName", "STRING").length(1024));
    }
    table.add_column(Column::new("c3", "LastName", "STRING"));
    table.set_primary_key(&["c1"]);

    if target {
        table.add_column(Column::new("c12", "CreatedAt", "TIMESTAMP").not_null(true));
        let mut by_name = Index::new("i1", "idx_singer_name", &["c2", "c12"]);
        by_name.keys[1].desc = true;
        table.add_index(by_name);
        table.add_index(Index::new("i3", "idx_created", &["c12"]));
        table.check_constraints = vec![CheckConstraint::new("cc1", "ck_first", "GivenName <> ''")];
    } else {
        table.add_index(Index::new("i1", "idx_singer_name", &["c2", "c3"]));
        table.add_index(Index::new("i2", "idx_last", &["c3"]));
        table.check_constraints = vec![
            CheckConstraint::new("cc1", "ck_first", "FirstName <> ''"),
            CheckConstraint::new("cc2", "ck_last", "LastName <> ''"),
        ];
    }
    table
}

fn albums(target: bool) -> Table {
    let mut table = Table::new("t2", "Albums");
    table.add_column(Column::new("c1", "SingerId", "INT64").not_null(true));
    table.add_column(Column::new("c5", "AlbumId", "INT64").not_null(true));
    table.add_column(Column::new("c6", "Title", "STRING"));
    table.set_primary_key(&["c1", "c5"]);
    table.add_foreign_key(ForeignKey::new("f1", "fk_albums_singers", &["c1"], "t1", &["c1"]));

    if target {
        table.parent_id = Some("t1".to_string());
    } else {
        table.add_foreign_key(ForeignKey::new("f2", "fk_album_title", &["c6"], "t1", &["c2"]));
    }
    table
}

fn songs(target: bool) -> Table {
    let mut table = Table::new("t3", "Songs");
    table.add_column(Column::new("c1", "SingerId", "INT64").not_null(true));
    table.add_column(Column::new("c5", "AlbumId", "INT64").not_null(true));
    table.add_column(Column::new("c9", "SongId", "INT64").not_null(true));
    table.add_column(Column::new("c10", "Name", "STRING"));
    table.set_primary_key(&["c1", "c5", "c9"]);

    if target {
        table.parent_id = Some("t2".to_string());
    }
    table
}

pub fn source_schema() -> DatabaseSchema {
    let mut schema = DatabaseSchema::new("music");
    schema.add_table(singers(false));
    schema.add_table(albums(false));
    schema.add_table(songs(false));

    let mut legacy = Table::new("t4", "Legacy");
    legacy.add_column(Column::new("c11", "Id", "INT64"));
    legacy.set_primary_key(&["c11"]);
    schema.add_table(legacy);
    schema
}

pub fn target_schema() -> DatabaseSchema {
    let mut schema = DatabaseSchema::new("music");
    schema.add_table(singers(true));
    schema.add_table(albums(true));
    schema.add_table(songs(true));
    schema.add_sequence(Sequence::new("s1", "song_seq"));
    schema.add_sequence(Sequence::new("s2", "album_seq"));
    schema
}

pub fn rates() -> IndexMap<String, Rating> {
    [("t1", Rating::Excellent), ("t2", Rating::Good), ("t4", Rating::Bad)]
        .into_iter()
        .map(|(id, rating)| (id.to_string(), rating))
        .collect()
}

pub fn music_snapshot() -> SchemaSnapshot {
    SchemaSnapshot::new(source_schema(), target_schema()).with_rates(rates())
}

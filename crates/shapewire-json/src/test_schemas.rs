//! Schemas shared by the unit tests

use shapewire_core::{Lazy, Schema, TimestampFormat, TraitSet, prelude_schemas};

pub static TAGS: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#Tags")
        .member("member", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

pub static NOTES: Lazy<Schema> = Lazy::new(|| {
    Schema::map("example#Notes")
        .traits(TraitSet::new().sparse())
        .member("key", &prelude_schemas::STRING, TraitSet::new())
        .member("value", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

pub static ROW: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#Row")
        .member("member", &prelude_schemas::INTEGER, TraitSet::new())
        .build()
});

pub static MATRIX: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#Matrix")
        .member("member", &ROW, TraitSet::new())
        .build()
});

pub static PROFILE: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Profile")
        .member(
            "name",
            &prelude_schemas::STRING,
            TraitSet::new().required().with_json_name("fullName"),
        )
        .member("avatar", &prelude_schemas::BLOB, TraitSet::new())
        .member("joined", &prelude_schemas::TIMESTAMP, TraitSet::new())
        .member(
            "updated",
            &prelude_schemas::TIMESTAMP,
            TraitSet::new().with_timestamp_format(TimestampFormat::DateTime),
        )
        .member("score", &prelude_schemas::DOUBLE, TraitSet::new())
        .member("tags", &TAGS, TraitSet::new())
        .member("notes", &NOTES, TraitSet::new())
        .build()
});

pub static CHOICE: Lazy<Schema> = Lazy::new(|| {
    Schema::union("example#Choice")
        .member("text", &prelude_schemas::STRING, TraitSet::new())
        .member("number", &prelude_schemas::INTEGER, TraitSet::new())
        .build()
});

pub const SCHEMA_SQL: &str = include_str!("../templates/schema.sql");
pub const SEED_FRUIT_OPTIONS_SQL: &str = include_str!("../templates/seed_fruit_options.sql");

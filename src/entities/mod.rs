pub mod entity_records;

pub mod prelude {
    pub use super::entity_records::Entity as EntityRecords;
}

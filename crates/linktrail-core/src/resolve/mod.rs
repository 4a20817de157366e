pub mod outcome;
pub mod provenance;

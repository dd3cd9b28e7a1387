mod domain_matcher;

pub use domain_matcher::{Classification, DomainMatcher, MappingTable, SpecialMatch};

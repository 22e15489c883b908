mod registry_tests;
mod entity_mapper_tests;
mod layout_tests;

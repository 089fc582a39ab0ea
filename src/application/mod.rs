pub mod autocomplete;
pub mod catalog;
pub mod launcher;
pub mod layout;
pub mod repo_setup;
pub mod selection;

#[cfg(test)]
mod test_support;

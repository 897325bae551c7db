mod catalog;
mod common;
mod eligibility;
mod store;

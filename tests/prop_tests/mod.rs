#[path = "prop_binder.rs"]
mod binder_props;
#[path = "prop_criteria.rs"]
mod criteria_props;

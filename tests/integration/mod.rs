mod helpers;
mod test_generate;
mod test_policy;

pub(crate) mod rate_limit;

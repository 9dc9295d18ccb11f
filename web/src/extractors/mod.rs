pub(crate) mod intake_authorization;

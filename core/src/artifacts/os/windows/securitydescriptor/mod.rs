pub(crate) mod sid;

pub mod sam;
pub(crate) mod securitydescriptor;

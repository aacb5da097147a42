pub(crate) mod photo;

mod imports {
    mod integration;
}

mod manifest {
    mod integration;
}

mod resolve {
    mod integration;
}

/// Path of a file under `tests/fixtures`.
#[cfg(test)]
pub(crate) fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

use super::*;

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (OvermarkError::validation("x"), "validation error:"),
        (OvermarkError::asset("x"), "asset error:"),
        (OvermarkError::probe("x"), "probe error:"),
        (OvermarkError::decode("x"), "decode error:"),
        (OvermarkError::encode("x"), "encode error:"),
        (OvermarkError::serde("x"), "serialization error:"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().starts_with(prefix), "{err}");
    }
}

#[test]
fn only_asset_errors_are_layer_local() {
    assert!(OvermarkError::asset("bad logo").is_layer_local());
    assert!(!OvermarkError::validation("x").is_layer_local());
    assert!(!OvermarkError::decode("x").is_layer_local());
    assert!(!OvermarkError::encode("x").is_layer_local());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OvermarkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

pub mod base_v1 {
    include!("generated/base.v1.rs");
}

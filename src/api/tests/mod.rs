//! Router-level tests driven through `tower::ServiceExt::oneshot`.

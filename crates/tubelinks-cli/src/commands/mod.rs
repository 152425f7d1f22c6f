pub mod chrome;
pub mod completion;
pub mod connect;
pub mod scan;

/// Runtime for one command's async part
pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

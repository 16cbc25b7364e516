use pgcall::{Caller, Config, StubBackend};

pub fn caller() -> Caller<StubBackend> {
    caller_with(StubBackend::new())
}

pub fn caller_with(backend: StubBackend) -> Caller<StubBackend> {
    Caller::with_config(backend, test_config())
}

pub fn test_config() -> Config {
    Config {
        search_path: None,
        signature_cache_size: 64,
    }
}

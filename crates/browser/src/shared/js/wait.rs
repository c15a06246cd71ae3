pub const CHECK_LOADING: &str = r#"
return {
    readyState: document.readyState,
    loading: document.readyState !== 'complete',
    activeRequests: performance.getEntriesByType('resource').filter(r => !r.responseEnd).length
};
"#;

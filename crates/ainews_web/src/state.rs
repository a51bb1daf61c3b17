use ainews_extractors::Pipeline;

pub struct AppState {
    pub pipeline: Pipeline,
}

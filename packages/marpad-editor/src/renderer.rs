use crate::{BoxFuture, DiagramRenderer, Result};

/// [`DiagramRenderer`] that delegates to the external rendering engine.
pub struct HttpRenderer {
	cfg: marpad_config::Renderer,
}
impl HttpRenderer {
	pub fn new(cfg: marpad_config::Renderer) -> Self {
		Self { cfg }
	}
}
impl DiagramRenderer for HttpRenderer {
	fn render<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(marpad_render::render(&self.cfg, code).await?) })
	}
}

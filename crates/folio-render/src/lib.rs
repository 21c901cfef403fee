pub mod detail;
pub mod element;
pub mod markdown;
pub mod measure;
pub mod page;
pub mod renderer;

pub use detail::render_detail_page;
pub use element::Element;
pub use element::Node;
pub use page::render_page;
pub use renderer::render_tile;

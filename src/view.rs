//! The view container and the renderer that swaps views into it.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::dom::Fragment;
use crate::template::TemplateLoader;
use crate::{ComponentPaths, Error, Result};

/// Which view the container currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Empty,
    Loader,
    Quote { img_url: String },
}

#[derive(Debug, Default)]
struct ContainerState {
    kind: ViewKind,
    content: Fragment,
}

/// Handle to the page region that holds the current view.
///
/// Clones share the same region, so a test or another thread can observe what
/// the renderer wrote.
#[derive(Debug, Clone)]
pub struct ViewContainer {
    id: String,
    state: Arc<Mutex<ContainerState>>,
}

impl ViewContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(ContainerState::default())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // The state stays consistent across a panic (every write is a full replace)
    fn lock(&self) -> MutexGuard<'_, ContainerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove all content
    pub fn clear(&self) {
        let mut st = self.lock();
        st.kind = ViewKind::Empty;
        st.content.clear();
    }

    /// Append rendered content and record which view it is
    pub fn append(&self, kind: ViewKind, fragment: Fragment) {
        let mut st = self.lock();
        st.kind = kind;
        st.content.append(fragment);
    }

    pub fn kind(&self) -> ViewKind {
        self.lock().kind.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().content.is_empty()
    }

    /// Copy of the current content
    pub fn content(&self) -> Fragment {
        self.lock().content.clone()
    }

    pub fn to_html(&self) -> String {
        self.lock().content.to_html()
    }
}

impl Default for ViewContainer {
    fn default() -> Self {
        Self::new(crate::CARD_CONTAINER_ID)
    }
}

/// Renders loader and quote-card views into a `ViewContainer`
pub struct ViewRenderer {
    loader: TemplateLoader,
    container: ViewContainer,
    paths: ComponentPaths,
    image_alt: String,
}

impl ViewRenderer {
    pub fn new(
        loader: TemplateLoader,
        container: ViewContainer,
        paths: ComponentPaths,
        image_alt: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            container,
            paths,
            image_alt: image_alt.into(),
        }
    }

    pub fn container(&self) -> &ViewContainer {
        &self.container
    }

    pub fn loader(&self) -> &TemplateLoader {
        &self.loader
    }

    /// Load both components into the template cache
    pub fn preload(&mut self) -> Result<()> {
        self.loader
            .preload([self.paths.loader.as_str(), self.paths.quote_card.as_str()])
    }

    /// Replace the container content with the loading view
    pub fn render_loader(&mut self) -> Result<()> {
        self.container.clear();
        let tpl = self.loader.load(&self.paths.loader)?;
        self.container.append(ViewKind::Loader, tpl.instantiate());
        Ok(())
    }

    /// Replace the container content with a quote card showing `img_url`
    pub fn render_quote(&mut self, img_url: &str) -> Result<()> {
        self.container.clear();
        let tpl = self.loader.load(&self.paths.quote_card)?;
        let mut node = tpl.instantiate();

        let img = node.find_first_mut("img").ok_or_else(|| {
            Error::RenderError(format!("No <img> in {}", self.paths.quote_card))
        })?;
        img.set_attr("src", img_url);
        img.set_attr("alt", self.image_alt.as_str());

        self.container.append(
            ViewKind::Quote {
                img_url: img_url.to_string(),
            },
            node,
        );
        Ok(())
    }

    /// Empty the container with no replacement
    pub fn clear(&self) {
        self.container.clear();
    }
}

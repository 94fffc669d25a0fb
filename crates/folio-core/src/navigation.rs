//! View-state navigation.
//!
//! The view tag and the post in focus live in one enum, so a detail view
//! without a post cannot be represented.

use crate::coordinator::Coordinator;
use crate::error::{Error, Result};
use crate::models::{Post, PostForm};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Home,
    Detail(Post),
    Admin,
    /// `None` when composing a new post
    Editor(Option<Post>),
}

/// The screen to render, without its payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Detail,
    Admin,
    Editor,
}

#[derive(Debug, Default)]
pub struct Navigator {
    state: NavigationState,
    scroll_offset: u32,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &NavigationState {
        &self.state
    }

    #[must_use]
    pub const fn view(&self) -> View {
        match self.state {
            NavigationState::Home => View::Home,
            NavigationState::Detail(_) => View::Detail,
            NavigationState::Admin => View::Admin,
            NavigationState::Editor(_) => View::Editor,
        }
    }

    /// The post being read or edited
    #[must_use]
    pub const fn selected(&self) -> Option<&Post> {
        match &self.state {
            NavigationState::Detail(post) | NavigationState::Editor(Some(post)) => Some(post),
            _ => None,
        }
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    fn transition(&mut self, state: NavigationState) {
        self.state = state;
        self.scroll_offset = 0;
    }

    pub fn go_home(&mut self) {
        self.transition(NavigationState::Home);
    }

    pub fn go_admin(&mut self) {
        self.transition(NavigationState::Admin);
    }

    pub fn view_post(&mut self, post: Post) {
        self.transition(NavigationState::Detail(post));
    }

    pub fn edit_post(&mut self, post: Post) {
        self.transition(NavigationState::Editor(Some(post)));
    }

    pub fn create_new(&mut self) {
        self.transition(NavigationState::Editor(None));
    }

    /// Initial form contents for the editor, `None` outside the editor.
    #[must_use]
    pub fn editor_form(&self) -> Option<PostForm> {
        match &self.state {
            NavigationState::Editor(Some(post)) => Some(PostForm::from_post(post)),
            NavigationState::Editor(None) => Some(PostForm::default()),
            _ => None,
        }
    }

    /// Submit the editor form.
    ///
    /// Updates the selected post or creates a new one, then moves to the
    /// admin view. Any failure, validation included, keeps the editor open
    /// and is returned to the caller.
    pub async fn save(&mut self, coordinator: &Coordinator, form: &PostForm) -> Result<Post> {
        let NavigationState::Editor(selection) = &self.state else {
            return Err(Error::Navigation(
                "posts can only be saved from the editor".to_string(),
            ));
        };
        let selected_id = selection.as_ref().map(|post| post.id.clone());

        let draft = form.normalize()?;
        let saved = match selected_id {
            Some(id) => coordinator.update(&id, &draft.into_patch()).await?,
            None => coordinator.create(&draft).await?,
        };

        self.go_admin();
        Ok(saved)
    }
}

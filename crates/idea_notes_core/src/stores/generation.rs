//! Note selection, idea generation and the generation history.

use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use super::{failure_message, read, write, StoreError, StoreResult};
use crate::domain::{
    AiProvider, Generation, GenerationRequest, NoteId, SaveAsNote, HISTORY_PER_PAGE,
};
use crate::ports::IdeaService;
use crate::validation::{validate_prompt, validate_selection_size, validate_title};

const GENERATE_FAILED: &str = "Failed to generate idea";
const SAVE_FAILED: &str = "Failed to save as note";
const HISTORY_FAILED: &str = "Failed to fetch generation history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationState {
    /// Set semantics; insertion order is kept only for display.
    pub selected_note_ids: Vec<NoteId>,
    pub is_generating: bool,
    pub generated_content: Option<Generation>,
    pub error: Option<String>,
    pub generation_history: Vec<Generation>,
    pub history_total: u64,
    pub history_page: u32,
    pub is_loading_history: bool,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            selected_note_ids: Vec::new(),
            is_generating: false,
            generated_content: None,
            error: None,
            generation_history: Vec::new(),
            history_total: 0,
            history_page: 1,
            is_loading_history: false,
        }
    }
}

impl GenerationState {
    pub fn history_pages(&self) -> u32 {
        crate::domain::total_pages(self.history_total, HISTORY_PER_PAGE)
    }
}

pub struct GenerationStore {
    ideas: Arc<dyn IdeaService>,
    state: RwLock<GenerationState>,
}

impl GenerationStore {
    pub fn new(ideas: Arc<dyn IdeaService>) -> Self {
        Self {
            ideas,
            state: RwLock::new(GenerationState::default()),
        }
    }

    pub fn snapshot(&self) -> GenerationState {
        read(&self.state).clone()
    }

    // --- Selection ---

    /// Replaces the selection. Duplicates collapse onto their first occurrence.
    pub fn set_selected_note_ids(&self, ids: &[NoteId]) {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        let mut state = write(&self.state);
        state.selected_note_ids = unique;
        state.error = None;
    }

    pub fn toggle_note_selection(&self, id: NoteId) {
        let mut state = write(&self.state);
        if let Some(pos) = state.selected_note_ids.iter().position(|n| *n == id) {
            state.selected_note_ids.remove(pos);
        } else {
            state.selected_note_ids.push(id);
        }
        state.error = None;
    }

    pub fn clear_selection(&self) {
        let mut state = write(&self.state);
        state.selected_note_ids.clear();
        state.error = None;
    }

    // --- Generation ---

    /// Asks the backend for an idea built from the selected notes.
    ///
    /// An empty or oversized selection, or an over-long prompt, fails locally: the
    /// error is recorded and nothing else changes. A network failure clears any
    /// previously generated content.
    pub async fn generate_idea(
        &self,
        prompt: Option<&str>,
        provider: AiProvider,
    ) -> StoreResult<Generation> {
        let prompt = prompt.filter(|p| !p.is_empty());
        let request = {
            let mut state = write(&self.state);
            let checked = validate_selection_size(state.selected_note_ids.len())
                .and_then(|_| prompt.map_or(Ok(()), validate_prompt));
            if let Err(message) = checked {
                state.error = Some(message.clone());
                return Err(StoreError::Validation(message));
            }

            state.is_generating = true;
            state.error = None;
            state.generated_content = None;
            GenerationRequest {
                note_ids: state.selected_note_ids.clone(),
                prompt: prompt.map(str::to_string),
                ai_provider: provider,
            }
        };

        debug!(
            notes = request.note_ids.len(),
            provider = %provider,
            "Requesting idea generation"
        );
        match self.ideas.generate_idea(&request).await {
            Ok(generation) => {
                info!(generation_id = generation.id, "Idea generated");
                let mut state = write(&self.state);
                state.generated_content = Some(generation.clone());
                state.is_generating = false;
                state.error = None;
                Ok(generation)
            }
            Err(e) => {
                warn!("Idea generation failed: {}", e);
                let mut state = write(&self.state);
                state.error = Some(failure_message(&e, GENERATE_FAILED));
                state.is_generating = false;
                state.generated_content = None;
                Err(e.into())
            }
        }
    }

    /// Persists a generation as a new note. The caller decides what to refresh.
    pub async fn save_as_note(&self, generation_id: NoteId, title: &str) -> StoreResult<()> {
        if let Err(message) = validate_title(title) {
            write(&self.state).error = Some(message.clone());
            return Err(StoreError::Validation(message));
        }
        write(&self.state).error = None;

        let request = SaveAsNote {
            generation_id,
            title: title.trim().to_string(),
        };
        match self.ideas.save_as_note(&request).await {
            Ok(note) => {
                info!(generation_id, note_id = note.id, "Generation saved as note");
                Ok(())
            }
            Err(e) => {
                warn!(generation_id, "Saving generation failed: {}", e);
                write(&self.state).error = Some(failure_message(&e, SAVE_FAILED));
                Err(e.into())
            }
        }
    }

    // --- History ---

    /// Loads one page of history, replacing whatever page was held before.
    pub async fn fetch_generation_history(&self, page: u32) -> StoreResult<()> {
        {
            let mut state = write(&self.state);
            state.is_loading_history = true;
            state.error = None;
        }

        match self.ideas.list_generations(page, HISTORY_PER_PAGE).await {
            Ok(result) => {
                debug!(
                    page = result.page,
                    items = result.items.len(),
                    total = result.total,
                    "Generation history loaded"
                );
                let mut state = write(&self.state);
                state.generation_history = result.items;
                state.history_total = result.total;
                state.history_page = result.page;
                state.is_loading_history = false;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(page, "Fetching generation history failed: {}", e);
                let mut state = write(&self.state);
                state.error = Some(failure_message(&e, HISTORY_FAILED));
                state.is_loading_history = false;
                Err(e.into())
            }
        }
    }

    // --- Resets ---

    pub fn clear_generation(&self) {
        let mut state = write(&self.state);
        state.generated_content = None;
        state.error = None;
    }

    pub fn clear_error(&self) {
        write(&self.state).error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GenerationPage, Note};
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::{mpsc, oneshot};

    fn generation(id: NoteId, note_ids: Vec<NoteId>) -> Generation {
        Generation {
            id,
            generated_content: "X".into(),
            ai_provider: "openai".into(),
            note_ids,
            prompt: String::new(),
            created_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Replays scripted responses and records every request it sees.
    #[derive(Default)]
    struct ScriptedIdeas {
        generate: Mutex<VecDeque<PortResult<Generation>>>,
        history: Mutex<VecDeque<PortResult<GenerationPage>>>,
        save: Mutex<VecDeque<PortResult<Note>>>,
        generate_requests: Mutex<Vec<GenerationRequest>>,
        history_requests: Mutex<Vec<(u32, u32)>>,
        save_requests: Mutex<Vec<SaveAsNote>>,
    }

    #[async_trait]
    impl IdeaService for ScriptedIdeas {
        async fn generate_idea(&self, request: &GenerationRequest) -> PortResult<Generation> {
            self.generate_requests.lock().unwrap().push(request.clone());
            self.generate
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected generate call")
        }

        async fn list_generations(&self, page: u32, per_page: u32) -> PortResult<GenerationPage> {
            self.history_requests.lock().unwrap().push((page, per_page));
            self.history
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected history call")
        }

        async fn save_as_note(&self, request: &SaveAsNote) -> PortResult<Note> {
            self.save_requests.lock().unwrap().push(request.clone());
            self.save
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected save call")
        }
    }

    fn store_with(ideas: ScriptedIdeas) -> (GenerationStore, Arc<ScriptedIdeas>) {
        let ideas = Arc::new(ideas);
        (GenerationStore::new(ideas.clone()), ideas)
    }

    #[test]
    fn test_initial_state() {
        let (store, _) = store_with(ScriptedIdeas::default());
        let state = store.snapshot();
        assert!(state.selected_note_ids.is_empty());
        assert_eq!(state.history_page, 1);
        assert_eq!(state.history_total, 0);
        assert!(!state.is_generating);
    }

    #[test]
    fn test_toggle_keeps_ids_toggled_an_odd_number_of_times() {
        let (store, _) = store_with(ScriptedIdeas::default());
        for id in [1, 2, 3, 2, 4, 1, 1, 5, 4, 4] {
            store.toggle_note_selection(id);
        }
        let mut selected = store.snapshot().selected_note_ids;
        selected.sort_unstable();
        assert_eq!(selected, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_selection_changes_clear_error() {
        let (store, _) = store_with(ScriptedIdeas::default());
        store.set_selected_note_ids(&[3, 1, 3]);
        assert_eq!(store.snapshot().selected_note_ids, vec![3, 1]);

        write(&store.state).error = Some("boom".into());
        store.toggle_note_selection(9);
        assert!(store.snapshot().error.is_none());

        write(&store.state).error = Some("boom".into());
        store.clear_selection();
        let state = store.snapshot();
        assert!(state.selected_note_ids.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_generate_with_empty_selection_never_calls_backend() {
        let (store, ideas) = store_with(ScriptedIdeas::default());
        write(&store.state).generated_content = Some(generation(3, vec![1]));

        let err = store.generate_idea(None, AiProvider::default()).await.unwrap_err();

        assert_eq!(err, StoreError::Validation("Please select at least one note".into()));
        assert!(ideas.generate_requests.lock().unwrap().is_empty());
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("Please select at least one note"));
        assert_eq!(state.generated_content.map(|g| g.id), Some(3));
        assert!(!state.is_generating);
    }

    #[tokio::test]
    async fn test_generate_success_stores_result() {
        let ideas = ScriptedIdeas::default();
        ideas
            .generate
            .lock()
            .unwrap()
            .push_back(Ok(generation(7, vec![1, 2])));
        let (store, ideas) = store_with(ideas);
        store.set_selected_note_ids(&[1, 2]);

        let result = store.generate_idea(None, AiProvider::default()).await.unwrap();

        assert_eq!(result.id, 7);
        let state = store.snapshot();
        assert!(!state.is_generating);
        assert_eq!(state.generated_content.as_ref().map(|g| g.id), Some(7));
        assert!(state.error.is_none());

        let requests = ideas.generate_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].note_ids, vec![1, 2]);
        assert_eq!(requests[0].ai_provider, AiProvider::OpenAi);
        assert!(requests[0].prompt.is_none());
    }

    #[tokio::test]
    async fn test_generate_omits_empty_prompt_and_forwards_real_one() {
        let ideas = ScriptedIdeas::default();
        {
            let mut queue = ideas.generate.lock().unwrap();
            queue.push_back(Ok(generation(1, vec![5])));
            queue.push_back(Ok(generation(2, vec![5])));
        }
        let (store, ideas) = store_with(ideas);
        store.toggle_note_selection(5);

        store.generate_idea(Some(""), AiProvider::Gemini).await.unwrap();
        store
            .generate_idea(Some("make it a poem"), AiProvider::Anthropic)
            .await
            .unwrap();

        let requests = ideas.generate_requests.lock().unwrap();
        assert!(requests[0].prompt.is_none());
        assert_eq!(requests[0].ai_provider, AiProvider::Gemini);
        assert_eq!(requests[1].prompt.as_deref(), Some("make it a poem"));
        assert_eq!(requests[1].ai_provider, AiProvider::Anthropic);
    }

    #[tokio::test]
    async fn test_generate_rejects_long_prompt_locally() {
        let (store, ideas) = store_with(ScriptedIdeas::default());
        store.toggle_note_selection(1);
        let prompt = "p".repeat(2001);

        let err = store
            .generate_idea(Some(&prompt), AiProvider::OpenAi)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert!(ideas.generate_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_failure_clears_previous_content() {
        let ideas = ScriptedIdeas::default();
        {
            let mut queue = ideas.generate.lock().unwrap();
            queue.push_back(Ok(generation(1, vec![1])));
            queue.push_back(Err(PortError::Rejected {
                status: 429,
                detail: "Rate limit exceeded".into(),
            }));
        }
        let (store, _) = store_with(ideas);
        store.toggle_note_selection(1);
        store.generate_idea(None, AiProvider::OpenAi).await.unwrap();

        let err = store.generate_idea(None, AiProvider::OpenAi).await.unwrap_err();

        assert_eq!(err.message(), "Rate limit exceeded");
        let state = store.snapshot();
        assert!(state.generated_content.is_none());
        assert_eq!(state.error.as_deref(), Some("Rate limit exceeded"));
        assert!(!state.is_generating);
    }

    #[tokio::test]
    async fn test_generate_failure_without_message_uses_fallback() {
        let ideas = ScriptedIdeas::default();
        ideas
            .generate
            .lock()
            .unwrap()
            .push_back(Err(PortError::Unavailable(String::new())));
        let (store, _) = store_with(ideas);
        store.toggle_note_selection(1);

        assert!(store.generate_idea(None, AiProvider::OpenAi).await.is_err());
        assert_eq!(store.snapshot().error.as_deref(), Some(GENERATE_FAILED));
    }

    #[tokio::test]
    async fn test_save_as_note_leaves_generation_alone() {
        let ideas = ScriptedIdeas::default();
        ideas.generate.lock().unwrap().push_back(Ok(generation(7, vec![1])));
        ideas.save.lock().unwrap().push_back(Ok(Note {
            id: 40,
            title: "Idea".into(),
            content: "X".into(),
            user_id: 1,
            created_date: Utc::now(),
            updated_date: Utc::now(),
        }));
        let (store, ideas) = store_with(ideas);
        store.toggle_note_selection(1);
        store.generate_idea(None, AiProvider::OpenAi).await.unwrap();

        store.save_as_note(7, "  Idea ").await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.generated_content.map(|g| g.id), Some(7));
        assert_eq!(state.selected_note_ids, vec![1]);
        assert!(state.error.is_none());
        let saved = ideas.save_requests.lock().unwrap();
        assert_eq!(
            saved[0],
            SaveAsNote {
                generation_id: 7,
                title: "Idea".into()
            }
        );
    }

    #[tokio::test]
    async fn test_save_as_note_failure_sets_error() {
        let ideas = ScriptedIdeas::default();
        ideas
            .save
            .lock()
            .unwrap()
            .push_back(Err(PortError::NotFound("Generation not found or access denied".into())));
        let (store, _) = store_with(ideas);

        let err = store.save_as_note(99, "Title").await.unwrap_err();

        assert!(matches!(err, StoreError::Port(PortError::NotFound(_))));
        assert_eq!(
            store.snapshot().error.as_deref(),
            Some("Generation not found or access denied")
        );
    }

    #[tokio::test]
    async fn test_save_as_note_requires_title() {
        let (store, ideas) = store_with(ScriptedIdeas::default());

        assert!(store.save_as_note(1, "   ").await.is_err());
        assert!(ideas.save_requests.lock().unwrap().is_empty());
        assert_eq!(store.snapshot().error.as_deref(), Some("Please enter a title"));
    }

    #[tokio::test]
    async fn test_fetch_history_replaces_page() {
        let ideas = ScriptedIdeas::default();
        {
            let mut queue = ideas.history.lock().unwrap();
            queue.push_back(Ok(GenerationPage {
                items: (1..=20).map(|id| generation(id, vec![1])).collect(),
                total: 45,
                page: 1,
                per_page: 20,
            }));
            queue.push_back(Ok(GenerationPage {
                items: (21..=23).map(|id| generation(id, vec![1])).collect(),
                total: 45,
                page: 2,
                per_page: 20,
            }));
        }
        let (store, ideas) = store_with(ideas);

        store.fetch_generation_history(1).await.unwrap();
        store.fetch_generation_history(2).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.history_page, 2);
        assert_eq!(state.history_total, 45);
        assert_eq!(state.generation_history.len(), 3);
        assert_eq!(state.generation_history[0].id, 21);
        assert_eq!(state.history_pages(), 3);
        assert!(!state.is_loading_history);
        assert_eq!(*ideas.history_requests.lock().unwrap(), vec![(1, 20), (2, 20)]);
    }

    #[tokio::test]
    async fn test_fetch_history_uses_server_reported_page() {
        let ideas = ScriptedIdeas::default();
        ideas.history.lock().unwrap().push_back(Ok(GenerationPage {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 20,
        }));
        let (store, _) = store_with(ideas);

        store.fetch_generation_history(5).await.unwrap();

        assert_eq!(store.snapshot().history_page, 1);
    }

    #[tokio::test]
    async fn test_fetch_history_failure_keeps_previous_items() {
        let ideas = ScriptedIdeas::default();
        {
            let mut queue = ideas.history.lock().unwrap();
            queue.push_back(Ok(GenerationPage {
                items: vec![generation(1, vec![1])],
                total: 1,
                page: 1,
                per_page: 20,
            }));
            queue.push_back(Err(PortError::Unavailable(
                "Failed to fetch generation history. Please try again.".into(),
            )));
        }
        let (store, _) = store_with(ideas);
        store.fetch_generation_history(1).await.unwrap();

        assert!(store.fetch_generation_history(2).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.generation_history.len(), 1);
        assert!(!state.is_loading_history);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch generation history. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_clear_generation_and_error() {
        let ideas = ScriptedIdeas::default();
        ideas.generate.lock().unwrap().push_back(Ok(generation(7, vec![1])));
        let (store, _) = store_with(ideas);
        store.toggle_note_selection(1);
        store.generate_idea(None, AiProvider::OpenAi).await.unwrap();

        store.clear_generation();
        let state = store.snapshot();
        assert!(state.generated_content.is_none());
        assert_eq!(state.selected_note_ids, vec![1]);

        write(&store.state).error = Some("boom".into());
        store.clear_error();
        assert!(store.snapshot().error.is_none());
    }

    /// Holds every call open until the test releases it through its oneshot.
    struct GatedIdeas {
        generate: Mutex<VecDeque<oneshot::Receiver<PortResult<Generation>>>>,
        history: Mutex<VecDeque<oneshot::Receiver<PortResult<GenerationPage>>>>,
        entered: mpsc::UnboundedSender<()>,
    }

    impl GatedIdeas {
        fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
            let (entered, rx) = mpsc::unbounded_channel();
            let ideas = Self {
                generate: Mutex::new(VecDeque::new()),
                history: Mutex::new(VecDeque::new()),
                entered,
            };
            (ideas, rx)
        }

        fn gate_generate(&self) -> oneshot::Sender<PortResult<Generation>> {
            let (tx, rx) = oneshot::channel();
            self.generate.lock().unwrap().push_back(rx);
            tx
        }

        fn gate_history(&self) -> oneshot::Sender<PortResult<GenerationPage>> {
            let (tx, rx) = oneshot::channel();
            self.history.lock().unwrap().push_back(rx);
            tx
        }
    }

    #[async_trait]
    impl IdeaService for GatedIdeas {
        async fn generate_idea(&self, _: &GenerationRequest) -> PortResult<Generation> {
            let gate = self.generate.lock().unwrap().pop_front().expect("unexpected generate call");
            self.entered.send(()).unwrap();
            gate.await.unwrap()
        }

        async fn list_generations(&self, _: u32, _: u32) -> PortResult<GenerationPage> {
            let gate = self.history.lock().unwrap().pop_front().expect("unexpected history call");
            self.entered.send(()).unwrap();
            gate.await.unwrap()
        }

        async fn save_as_note(&self, _: &SaveAsNote) -> PortResult<Note> {
            Err(PortError::Unexpected("not needed".into()))
        }
    }

    #[tokio::test]
    async fn test_is_generating_while_request_is_pending() {
        let (ideas, mut entered) = GatedIdeas::new();
        let release = ideas.gate_generate();
        let store = GenerationStore::new(Arc::new(ideas));
        store.toggle_note_selection(1);
        write(&store.state).generated_content = Some(generation(3, vec![1]));

        let driver = async {
            entered.recv().await.unwrap();
            let state = store.snapshot();
            assert!(state.is_generating);
            assert!(state.generated_content.is_none());
            release.send(Ok(generation(7, vec![1]))).unwrap();
        };
        let (result, ()) = tokio::join!(store.generate_idea(None, AiProvider::OpenAi), driver);

        assert_eq!(result.unwrap().id, 7);
        let state = store.snapshot();
        assert!(!state.is_generating);
        assert_eq!(state.generated_content.map(|g| g.id), Some(7));
    }

    #[tokio::test]
    async fn test_overlapping_generations_last_response_wins() {
        let (ideas, mut entered) = GatedIdeas::new();
        let first = ideas.gate_generate();
        let second = ideas.gate_generate();
        let store = GenerationStore::new(Arc::new(ideas));
        store.toggle_note_selection(1);

        let driver = async {
            entered.recv().await.unwrap();
            entered.recv().await.unwrap();
            second.send(Ok(generation(2, vec![1]))).unwrap();
            while store.snapshot().generated_content.is_none() {
                tokio::task::yield_now().await;
            }
            assert_eq!(store.snapshot().generated_content.map(|g| g.id), Some(2));
            first.send(Ok(generation(1, vec![1]))).unwrap();
        };
        let (a, b, ()) = tokio::join!(
            store.generate_idea(None, AiProvider::OpenAi),
            store.generate_idea(None, AiProvider::Anthropic),
            driver
        );

        assert_eq!(a.unwrap().id, 1);
        assert_eq!(b.unwrap().id, 2);
        let state = store.snapshot();
        assert!(!state.is_generating);
        assert_eq!(state.generated_content.map(|g| g.id), Some(1));
    }

    #[tokio::test]
    async fn test_is_loading_history_while_request_is_pending() {
        let (ideas, mut entered) = GatedIdeas::new();
        let release = ideas.gate_history();
        let store = GenerationStore::new(Arc::new(ideas));

        let driver = async {
            entered.recv().await.unwrap();
            assert!(store.snapshot().is_loading_history);
            release
                .send(Ok(GenerationPage {
                    items: vec![generation(9, vec![1])],
                    total: 1,
                    page: 1,
                    per_page: HISTORY_PER_PAGE,
                }))
                .unwrap();
        };
        let (result, ()) = tokio::join!(store.fetch_generation_history(1), driver);

        result.unwrap();
        let state = store.snapshot();
        assert!(!state.is_loading_history);
        assert_eq!(state.generation_history.len(), 1);
    }
}

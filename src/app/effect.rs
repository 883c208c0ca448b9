#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    LoadScene { path: Option<String> },
}

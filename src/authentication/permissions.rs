use crate::{
    error::Error,
    jwt::SessionData,
    schema::{Label, LabelKind, Uuid},
    store::Store,
};

/// Records that belong to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Label {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl SessionData {
    pub fn owns<T: Owned>(&self, record: &T) -> bool {
        record.owner_id() == self.user_id
    }

    /// Resolves label ids supplied by the caller. Every id must exist and be
    /// owned by the caller; others are reported as if they did not exist.
    pub async fn authorize_labels(
        &self,
        kind: LabelKind,
        ids: &[Uuid],
        store: &dyn Store,
    ) -> Result<Vec<Label>, Error> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let found = store.get_labels(kind, ids).await?;

        ids.iter()
            .map(|id| {
                found
                    .iter()
                    .find(|label| label.id == *id && self.owns(*label))
                    .cloned()
                    .ok_or_else(|| {
                        Error::validation(
                            kind.field(),
                            format!("Invalid pk \"{id}\" - object does not exist."),
                        )
                    })
            })
            .collect()
    }
}

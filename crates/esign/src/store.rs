//! Record persistence

use crate::models::{Document, Invitation, Signature, SignedDocument, User};
use crate::Result;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Storage for the service's records
///
/// Lookups return owned copies. Removing a record does not cascade; the
/// service removes dependent records itself.
pub trait Store {
    fn user(&self, id: u64) -> Result<Option<User>>;
    fn users(&self) -> Result<Vec<User>>;
    fn save_user(&mut self, user: User) -> Result<()>;

    fn document(&self, id: Uuid) -> Result<Option<Document>>;
    fn documents_for(&self, owner_id: u64) -> Result<Vec<Document>>;
    fn save_document(&mut self, document: Document) -> Result<()>;
    fn remove_document(&mut self, id: Uuid) -> Result<Option<Document>>;

    fn signature(&self, id: Uuid) -> Result<Option<Signature>>;
    fn signatures_for(&self, owner_id: u64) -> Result<Vec<Signature>>;
    fn save_signature(&mut self, signature: Signature) -> Result<()>;
    fn remove_signature(&mut self, id: Uuid) -> Result<Option<Signature>>;

    fn signed_document(&self, id: Uuid) -> Result<Option<SignedDocument>>;
    fn signed_documents(&self) -> Result<Vec<SignedDocument>>;
    fn save_signed_document(&mut self, signed: SignedDocument) -> Result<()>;
    fn remove_signed_document(&mut self, id: Uuid) -> Result<Option<SignedDocument>>;

    fn invitation(&self, document_id: Uuid, token: Uuid) -> Result<Option<Invitation>>;
    fn invitations_for(&self, document_id: Uuid) -> Result<Vec<Invitation>>;
    fn save_invitation(&mut self, invitation: Invitation) -> Result<()>;
    fn remove_invitation(&mut self, id: Uuid) -> Result<Option<Invitation>>;
}

/// In-memory [`Store`]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: BTreeMap<u64, User>,
    documents: BTreeMap<Uuid, Document>,
    signatures: BTreeMap<Uuid, Signature>,
    signed: BTreeMap<Uuid, SignedDocument>,
    invitations: BTreeMap<Uuid, Invitation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut store = Self::new();
        for user in users {
            store.users.insert(user.id, user);
        }
        store
    }
}

impl Store for MemoryStore {
    fn user(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn users(&self) -> Result<Vec<User>> {
        Ok(self.users.values().cloned().collect())
    }

    fn save_user(&mut self, user: User) -> Result<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    fn document(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.documents.get(&id).cloned())
    }

    fn documents_for(&self, owner_id: u64) -> Result<Vec<Document>> {
        let mut documents: Vec<_> = self
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        // Newest first
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(documents)
    }

    fn save_document(&mut self, document: Document) -> Result<()> {
        self.documents.insert(document.id, document);
        Ok(())
    }

    fn remove_document(&mut self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.documents.remove(&id))
    }

    fn signature(&self, id: Uuid) -> Result<Option<Signature>> {
        Ok(self.signatures.get(&id).cloned())
    }

    fn signatures_for(&self, owner_id: u64) -> Result<Vec<Signature>> {
        let mut signatures: Vec<_> = self
            .signatures
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        signatures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(signatures)
    }

    fn save_signature(&mut self, signature: Signature) -> Result<()> {
        self.signatures.insert(signature.id, signature);
        Ok(())
    }

    fn remove_signature(&mut self, id: Uuid) -> Result<Option<Signature>> {
        Ok(self.signatures.remove(&id))
    }

    fn signed_document(&self, id: Uuid) -> Result<Option<SignedDocument>> {
        Ok(self.signed.get(&id).cloned())
    }

    fn signed_documents(&self) -> Result<Vec<SignedDocument>> {
        Ok(self.signed.values().cloned().collect())
    }

    fn save_signed_document(&mut self, signed: SignedDocument) -> Result<()> {
        self.signed.insert(signed.id, signed);
        Ok(())
    }

    fn remove_signed_document(&mut self, id: Uuid) -> Result<Option<SignedDocument>> {
        Ok(self.signed.remove(&id))
    }

    fn invitation(&self, document_id: Uuid, token: Uuid) -> Result<Option<Invitation>> {
        Ok(self
            .invitations
            .values()
            .find(|i| i.document_id == document_id && i.token == token)
            .cloned())
    }

    fn invitations_for(&self, document_id: Uuid) -> Result<Vec<Invitation>> {
        Ok(self
            .invitations
            .values()
            .filter(|i| i.document_id == document_id)
            .cloned()
            .collect())
    }

    fn save_invitation(&mut self, invitation: Invitation) -> Result<()> {
        self.invitations.insert(invitation.id, invitation);
        Ok(())
    }

    fn remove_invitation(&mut self, id: Uuid) -> Result<Option<Invitation>> {
        Ok(self.invitations.remove(&id))
    }
}

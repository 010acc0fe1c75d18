use super::types::{step, AppSftpState};
use crate::session::listing::{Listing, ListingRow};

impl AppSftpState {
    /// Show a new remote listing. The selection survives a refresh of the
    /// same directory and resets when the directory changed.
    pub fn set_remote_listing(&mut self, listing: Listing) {
        let same_dir = self
            .remote_listing
            .as_ref()
            .is_some_and(|old| old.path == listing.path);

        if !same_dir {
            self.remote_selected = 0;
        }
        if self.remote_selected >= listing.rows.len() {
            self.remote_selected = listing.rows.len().saturating_sub(1);
        }
        self.remote_table_state.select(Some(self.remote_selected));
        self.remote_listing = Some(listing);
    }

    pub fn remote_path(&self) -> Option<&str> {
        self.remote_listing.as_ref().map(|l| l.path.as_str())
    }

    fn remote_len(&self) -> usize {
        self.remote_listing.as_ref().map_or(0, |l| l.rows.len())
    }

    pub fn navigate_remote_up(&mut self) {
        self.remote_selected = step(self.remote_selected, self.remote_len(), false);
        self.remote_table_state.select(Some(self.remote_selected));
    }

    pub fn navigate_remote_down(&mut self) {
        self.remote_selected = step(self.remote_selected, self.remote_len(), true);
        self.remote_table_state.select(Some(self.remote_selected));
    }

    pub fn selected_remote(&self) -> Option<&ListingRow> {
        self.remote_listing.as_ref()?.rows.get(self.remote_selected)
    }
}

use crate::group::NewsGroup;
use crate::mailbox::{LiveMailbox, live_unread};
use crate::registry::GroupRegistry;
use tracing::debug;

/// The open mailbox, if it shows `name`
fn open_as<'a>(
    live: Option<&'a mut dyn LiveMailbox>,
    name: &str,
) -> Option<&'a mut dyn LiveMailbox> {
    live.filter(|mailbox| mailbox.group_name() == name)
}

fn set_all_read(mailbox: &mut dyn LiveMailbox, read: bool) {
    for index in 0..mailbox.articles().len() {
        mailbox.set_read(index, read);
    }
}

impl GroupRegistry {
    /// Subscribe to a group, creating it if needed
    ///
    /// A group without range state gets the `[1, 0]` marker so it is written
    /// to the newsrc. Returns `None` for an empty name.
    pub fn subscribe(&mut self, name: &str) -> Option<&mut NewsGroup> {
        if name.is_empty() {
            return None;
        }

        debug!("Subscribing to {}", name);
        let group = self.find_or_create(name);
        group.subscribed = true;
        group.ensure_ranges();
        Some(group)
    }

    /// Unsubscribe from a tracked group
    ///
    /// Its ranges are dropped unless `save_unsubscribed` is set. Returns
    /// `None` if the group is unknown.
    pub fn unsubscribe(&mut self, name: &str, save_unsubscribed: bool) -> Option<&mut NewsGroup> {
        let group = self.get_mut(name)?;

        debug!("Unsubscribing from {}", name);
        group.subscribed = false;
        if !save_unsubscribed {
            group.clear_read_ranges();
        }
        Some(group)
    }

    /// Mark every article of a tracked group as read
    ///
    /// If `live` is showing this group, all its loaded articles are flagged
    /// read too. Returns `None` if the group is unknown.
    pub fn catchup(
        &mut self,
        name: &str,
        live: Option<&mut dyn LiveMailbox>,
    ) -> Option<&mut NewsGroup> {
        let group = self.get_mut(name)?;

        debug!("Catching up {}", name);
        let last = group.last_article;
        if let Some(ranges) = group.ranges_mut() {
            ranges.catchup(last);
        }
        group.unread = 0;

        if let Some(mailbox) = open_as(live, name) {
            set_all_read(mailbox, true);
        }
        Some(group)
    }

    /// Mark every article of a tracked group as unread
    ///
    /// Articles below the server's first article stay read. If `live` is
    /// showing this group, all loaded articles are flagged unread and the
    /// unread count is taken from them. Otherwise a group without ranges
    /// counts every article up to the last one as unread. Returns `None` if
    /// the group is unknown.
    pub fn uncatchup(
        &mut self,
        name: &str,
        live: Option<&mut dyn LiveMailbox>,
    ) -> Option<&mut NewsGroup> {
        let group = self.get_mut(name)?;

        debug!("Uncatching up {}", name);
        let first = group.first_article;
        if let Some(ranges) = group.ranges_mut() {
            ranges.uncatchup(first);
        }

        group.unread = match open_as(live, name) {
            Some(mailbox) => {
                set_all_read(mailbox, false);
                live_unread(mailbox)
            }
            None => match group.read_ranges() {
                Some(ranges) => group.last_article.saturating_sub(ranges.last_article()),
                None => group.last_article,
            },
        };
        Some(group)
    }

    /// First subscribed group with unread articles, in registry order
    ///
    /// For the group shown in `live`, the unread count is taken from the
    /// loaded articles instead of the cached count, and the group is skipped
    /// if nothing there is unread.
    pub fn next_unread_group(&self, live: Option<&dyn LiveMailbox>) -> Option<&NewsGroup> {
        self.iter().find(|group| {
            if !group.subscribed || group.unread_count() == 0 {
                return false;
            }
            match live {
                Some(mailbox) if mailbox.group_name() == group.name() => live_unread(mailbox) > 0,
                _ => true,
            }
        })
    }
}

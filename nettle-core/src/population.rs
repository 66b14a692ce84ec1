//! The living collection of nettles and the rules that connect them.
//!
//! Plucking one nettle grants rhizome growth to its nearest living
//! neighbour, which may in turn germinate a new nettle beside itself.

use crate::{
    canvas::Canvas,
    config::Config,
    frame::FrameContext,
    nettle::{Nettle, Sowing},
    plant::CanopyState,
    types::NettleId,
};
use glam::Vec2;
use rand::{Rng, rngs::StdRng};
use tracing::{debug, info, warn};

/// Resampling attempts before a germination spot is clamped into bounds.
const MAX_PLACEMENT_ATTEMPTS: usize = 64;

/// Nettles ordered back to front by descending z-depth.
#[derive(Debug)]
pub struct Nettles {
    nettles: Vec<Nettle>,
    next_id: NettleId,
    cfg: Config,
    /// Randomness that must not repeat frame to frame.
    entropy: StdRng,
}

impl Nettles {
    pub fn new(cfg: Config, entropy: StdRng) -> Self {
        Self {
            nettles: Vec::with_capacity(cfg.nettle_count),
            next_id: 0,
            cfg,
            entropy,
        }
    }

    /// Sows `cfg.nettle_count` nettles at random spots on the floor.
    ///
    /// Every third nettle is sown big. The collection is sorted once
    /// all of them exist.
    pub fn populate(&mut self, now_ms: f64) {
        let floor = self.cfg.floor_height();
        for i in 0..self.cfg.nettle_count {
            let x = self.entropy.random::<f32>() * self.cfg.width;
            let id = self.allocate_id();
            let sowing = Sowing::Hinted { big: i % 3 == 0 };
            let nettle = Nettle::new(
                id,
                Vec2::new(x, floor),
                sowing,
                &self.cfg,
                &mut self.entropy,
                now_ms,
            );
            self.nettles.push(nettle);
        }
        self.sort_by_z_depth();
    }

    fn allocate_id(&mut self) -> NettleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nettles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nettles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Nettle> {
        self.nettles.iter()
    }

    pub fn get(&self, id: NettleId) -> Option<&Nettle> {
        self.nettles.iter().find(|n| n.id() == id)
    }

    pub fn get_mut(&mut self, id: NettleId) -> Option<&mut Nettle> {
        self.nettles.iter_mut().find(|n| n.id() == id)
    }

    pub fn plucked_count(&self) -> usize {
        self.nettles.iter().filter(|n| n.is_plucked()).count()
    }

    /// Adds an already built nettle and restores draw order.
    pub fn insert(&mut self, nettle: Nettle) {
        self.next_id = self.next_id.max(nettle.id() + 1);
        self.nettles.push(nettle);
        self.sort_by_z_depth();
    }

    /// Removes a nettle without re-sorting the rest.
    pub fn delete_nettle(&mut self, id: NettleId) -> Option<Nettle> {
        let index = self.nettles.iter().position(|n| n.id() == id)?;
        Some(self.nettles.remove(index))
    }

    /// Sorts back to front: higher z-depth first.
    ///
    /// The sort is stable, so equal depths keep their insertion order.
    pub fn sort_by_z_depth(&mut self) {
        self.nettles.sort_by(|a, b| b.z_depth().cmp(&a.z_depth()));
    }

    /// Finds the unplucked nettle whose anchor is horizontally closest
    /// to `point`.
    ///
    /// Only the x distance is compared, since every anchor sits on the
    /// same floor line. Ties go to the earlier nettle in draw order.
    ///
    /// ### Parameters
    /// - `point` - Query position; only `point.x` is used.
    /// - `excluding` - A nettle that must not be returned.
    ///
    /// ### Returns
    /// - `Some(id)` of the nearest candidate.
    /// - `None` if no unplucked nettle other than `excluding` exists.
    pub fn find_nearest_to(
        &self,
        point: Vec2,
        excluding: Option<NettleId>,
    ) -> Option<NettleId> {
        self.nettles
            .iter()
            .filter(|n| Some(n.id()) != excluding && !n.is_plucked())
            .min_by(|a, b| {
                let da = (point.x - a.anchor().x).abs();
                let db = (point.x - b.anchor().x).abs();
                da.total_cmp(&db)
            })
            .map(Nettle::id)
    }

    /// Picks an x position `germination_offset` away from `parent_x`,
    /// on a random side, outside the edge margins.
    ///
    /// Out-of-bounds picks are resampled. After a bounded number of
    /// attempts the last pick is clamped into whichever side still has
    /// legal spots, so the offset range is kept. A validated config
    /// always has such a side.
    pub fn germination_x(&self, parent_x: f32, rng: &mut impl Rng) -> f32 {
        let (near, far) = self.cfg.germination_offset;
        let min_x = self.cfg.edge_margin;
        let max_x = self.cfg.width - self.cfg.edge_margin;

        let mut x = parent_x;
        for attempt in 0..MAX_PLACEMENT_ATTEMPTS {
            let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let amount = near + rng.random::<f32>() * (far - near);
            x = parent_x + side * amount;
            if (min_x..=max_x).contains(&x) {
                return x;
            }
            debug!(attempt, x, "germination spot outside margins, resampling");
        }

        let right = ((parent_x + near).max(min_x), (parent_x + far).min(max_x));
        let left = ((parent_x - far).max(min_x), (parent_x - near).min(max_x));
        let band = match (right.0 <= right.1, left.0 <= left.1) {
            (true, true) if x < parent_x => Some(left),
            (true, _) => Some(right),
            (false, true) => Some(left),
            (false, false) => None,
        };
        warn!(parent_x, "germination placement exhausted, clamping");
        match band {
            Some((lo, hi)) => x.max(lo).min(hi),
            None => x.max(min_x).min(max_x),
        }
    }

    /// Plants a new small nettle near `parent_anchor`.
    ///
    /// ### Returns
    /// - `Some(id)` of the new nettle.
    /// - `None` if the population is already at its configured cap.
    pub fn plant_nettle(
        &mut self,
        parent_anchor: Vec2,
        ctx: &mut FrameContext,
    ) -> Option<NettleId> {
        if let Some(cap) = self.cfg.max_population
            && self.nettles.len() >= cap
        {
            warn!(cap, "population cap reached, skipping germination");
            return None;
        }

        let now = ctx.now_ms();
        let x = self.germination_x(parent_anchor.x, &mut ctx.rng);
        let initial = ctx.rng.random::<f32>() * self.cfg.unit_branch_distance;
        let id = self.allocate_id();
        let nettle = Nettle::new(
            id,
            Vec2::new(x, self.cfg.floor_height()),
            Sowing::Sized(initial),
            &self.cfg,
            &mut ctx.rng,
            now,
        );
        info!(id, x, z_depth = nettle.z_depth(), "nettle germinated");
        self.nettles.push(nettle);
        self.sort_by_z_depth();
        Some(id)
    }

    /// Plants a new nettle next to the nettle `id`.
    pub fn germinate(&mut self, id: NettleId, ctx: &mut FrameContext) -> Option<NettleId> {
        let anchor = self.get(id)?.anchor();
        self.plant_nettle(anchor, ctx)
    }

    /// Grants rhizome growth to nettle `id`, germinating a neighbour if
    /// its coin flip says so.
    ///
    /// ### Returns
    /// The id of a newly germinated nettle, if any.
    pub fn grow_rhizome(&mut self, id: NettleId, ctx: &mut FrameContext) -> Option<NettleId> {
        let now = ctx.now_ms();
        let nettle = self.nettles.iter_mut().find(|n| n.id() == id)?;
        let spread = nettle.grow_rhizome(&self.cfg, &mut ctx.rng, &mut self.entropy, now);
        debug!(id, target = nettle.target_size(), spread, "rhizome growth");
        if spread {
            self.germinate(id, ctx)
        } else {
            None
        }
    }

    /// Plucks nettle `id` and passes rhizome growth to its nearest
    /// unplucked neighbour.
    ///
    /// The last nettle with an attached canopy is never plucked, so the
    /// population always keeps a living nettle to take rhizome growth.
    ///
    /// ### Returns
    /// `false` if `id` is unknown, its canopy is already departing or
    /// plucked, or it is the last attached nettle; nothing happens in
    /// that case.
    pub fn pluck(&mut self, id: NettleId, ctx: &mut FrameContext) -> bool {
        let has_attached_neighbour = self
            .nettles
            .iter()
            .any(|n| n.id() != id && n.canopy_state() == CanopyState::Attached);
        if !has_attached_neighbour {
            warn!(id, "refusing to pluck the last attached nettle");
            return false;
        }

        let now = ctx.now_ms();
        let Some(nettle) = self.nettles.iter_mut().find(|n| n.id() == id) else {
            return false;
        };
        if !nettle.pluck(&self.cfg, &mut ctx.rng, now) {
            return false;
        }
        let anchor = nettle.anchor();
        info!(id, x = anchor.x, "nettle plucked");

        let neighbour = self.find_nearest_to(anchor, Some(id));
        debug_assert!(neighbour.is_some(), "attached neighbour vanished during pluck");
        match neighbour {
            Some(neighbour) => {
                self.grow_rhizome(neighbour, ctx);
            }
            None => warn!(id, "no unplucked neighbour left to take rhizome growth"),
        }
        true
    }

    /// Advances every nettle's animations to the frame time.
    pub fn update(&mut self, ctx: &FrameContext) {
        let now = ctx.now_ms();
        for nettle in &mut self.nettles {
            nettle.update(now);
        }
    }

    /// Draws every nettle back to front.
    pub fn render(&self, canvas: &mut dyn Canvas, ctx: &FrameContext) {
        for nettle in &self.nettles {
            nettle.render(canvas, ctx);
        }
    }
}

//! Sprite groups: the decision trees that pick a sprite or callback result.
//!
//! Groups are built by [`crate::actions::groups`] and stored in a
//! [`SpriteGroupPool`] for the lifetime of a load. Each file keeps its own
//! table mapping local group ids to [`GroupId`] handles; children are bound
//! to handles when their parent is built, so later reuse of a local id does
//! not affect groups that were already built. An absent child (`None`)
//! resolves to [`Resolved::Empty`].
//!
//! ## Variants
//! ```text
//! Callback       terminal 15-bit callback result
//! Result         sprite range of a sprite set
//! Real           loaded/loading alternatives, picked by the object
//! Deterministic  var-adjust chain -> ranges -> child, or default
//! Randomized     child picked by random bits, optional re-randomisation
//! ```

use std::collections::HashMap;

use crate::vars::{VarEnv, global_variable};

/// Handle of a group in a [`SpriteGroupPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u32);

impl GroupId {
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whose variables a group reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarScope {
    /// The object itself.
    Current,
    /// The related object (vehicle chain head, station town, ...).
    Parent,
}

/// Operand width of a deterministic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSize {
    Byte,
    Word,
    Dword,
}

impl GroupSize {
    pub fn width(self) -> usize {
        match self {
            GroupSize::Byte => 1,
            GroupSize::Word => 2,
            GroupSize::Dword => 4,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            GroupSize::Byte => 0xFF,
            GroupSize::Word => 0xFFFF,
            GroupSize::Dword => 0xFFFF_FFFF,
        }
    }

    fn unsigned(self, v: u32) -> u32 {
        v & self.mask()
    }

    fn signed(self, v: u32) -> i32 {
        match self {
            GroupSize::Byte => v as u8 as i8 as i32,
            GroupSize::Word => v as u16 as i16 as i32,
            GroupSize::Dword => v as i32,
        }
    }
}

/// Post-processing applied to a variable before it is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustType {
    None,
    /// `(value + add) / divmod`, signed.
    Div,
    /// `(value + add) % divmod`, signed.
    Mod,
}

/// How an adjusted value combines with the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOp {
    Add,
    Sub,
    SMin,
    SMax,
    UMin,
    UMax,
    SDiv,
    SMod,
    UDiv,
    UMod,
    Mul,
    And,
    Or,
    Xor,
    /// Store the running result in a temporary register.
    Sto,
    /// Replace the running result.
    Rst,
    /// Store the running result in persistent storage.
    Stop,
    Ror,
    SCmp,
    UCmp,
    Shl,
    Shr,
    Sar,
}

impl AdjustOp {
    pub fn from_u8(op: u8) -> Option<Self> {
        use AdjustOp::*;
        const OPS: [AdjustOp; 23] = [
            Add, Sub, SMin, SMax, UMin, UMax, SDiv, SMod, UDiv, UMod, Mul, And, Or, Xor, Sto, Rst,
            Stop, Ror, SCmp, UCmp, Shl, Shr, Sar,
        ];
        OPS.get(op as usize).copied()
    }
}

/// One step of a deterministic group's computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarAdjust {
    pub op: AdjustOp,
    pub kind: AdjustType,
    pub variable: u8,
    /// Sub-parameter for variables `0x60..=0x7F`.
    pub parameter: u8,
    /// Group called by variable 0x7E.
    pub subroutine: Option<GroupId>,
    pub shift: u8,
    pub and_mask: u32,
    pub add_val: u32,
    pub divmod_val: u32,
}

/// Inclusive value range selecting a child group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRange {
    pub group: Option<GroupId>,
    pub low: u32,
    pub high: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicGroup {
    pub scope: VarScope,
    pub size: GroupSize,
    pub adjusts: Vec<VarAdjust>,
    /// Checked in declaration order; the first match wins.
    pub ranges: Vec<GroupRange>,
    pub default: Option<GroupId>,
}

impl DeterministicGroup {
    /// Group used when a variable is unavailable.
    fn error_group(&self) -> Option<GroupId> {
        self.ranges.first().map_or(self.default, |r| r.group)
    }
}

/// Trigger matching mode of a randomized group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomizedGroup {
    pub scope: VarScope,
    pub mode: TriggerMode,
    pub triggers: u8,
    /// Related object for the relative scope, 0 otherwise.
    pub count: u8,
    pub lowest_randbit: u8,
    pub groups: Vec<Option<GroupId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealGroup {
    pub loaded: Vec<Option<GroupId>>,
    pub loading: Vec<Option<GroupId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteGroup {
    Callback(u16),
    Result { sprite: u32, num_sprites: u16 },
    Real(RealGroup),
    Deterministic(DeterministicGroup),
    Randomized(RandomizedGroup),
}

/// Arena holding every group built during a load.
#[derive(Debug, Default)]
pub struct SpriteGroupPool {
    groups: Vec<SpriteGroup>,
    callbacks: HashMap<u16, GroupId>,
}

impl SpriteGroupPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: SpriteGroup) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(group);
        id
    }

    /// Shared node for callback result `value`.
    pub fn callback(&mut self, value: u16) -> GroupId {
        if let Some(&id) = self.callbacks.get(&value) {
            return id;
        }
        let id = self.insert(SpriteGroup::Callback(value));
        self.callbacks.insert(value, id);
        id
    }

    pub fn get(&self, id: GroupId) -> Option<&SpriteGroup> {
        self.groups.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.callbacks.clear();
    }
}

/// Outcome of resolving a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// No sprite: missing child or nothing matched.
    Empty,
    Callback(u16),
    Sprite { sprite: u32, num_sprites: u16 },
}

/// Callback value returned when a subroutine does not produce one.
pub const CALLBACK_FAILED: u16 = 0x7FFF;

const MAX_DEPTH: u32 = 64;
const TEMP_REGISTERS: usize = 0x110;

/// Object-specific side of group resolution.
pub trait ScopeResolver {
    /// Read object variable `variable` (with `parameter` for the
    /// parameterised range). `None` marks the variable as unavailable.
    fn variable(&self, scope: VarScope, variable: u8, parameter: u8) -> Option<u32>;

    fn random_bits(&self, _scope: VarScope) -> u32 {
        0
    }

    fn waiting_triggers(&self, _scope: VarScope) -> u32 {
        0
    }

    /// Pick the child of a real group.
    fn select_real(&self, real: &RealGroup) -> Option<GroupId> {
        real.loaded
            .first()
            .or_else(|| real.loading.first())
            .copied()
            .flatten()
    }

    fn store_persistent(&mut self, _register: u32, _value: u32) {}
}

/// Walks a group graph for one object.
pub struct Resolver<'a, S> {
    pool: &'a SpriteGroupPool,
    env: Option<&'a VarEnv<'a>>,
    scope: S,
    temp: Vec<u32>,
    last_value: u32,
    reseed: u32,
    used_triggers: u32,
    /// Callback being run, readable through variable 0x0C.
    pub callback: u16,
    pub callback_param1: u32,
    pub callback_param2: u32,
}

impl<'a, S: ScopeResolver> Resolver<'a, S> {
    pub fn new(pool: &'a SpriteGroupPool, scope: S) -> Self {
        Self {
            pool,
            env: None,
            scope,
            temp: vec![0; TEMP_REGISTERS],
            last_value: 0,
            reseed: 0,
            used_triggers: 0,
            callback: 0,
            callback_param1: 0,
            callback_param2: 0,
        }
    }

    /// Serve global variables and GRF parameters from `env`.
    pub fn with_env(mut self, env: &'a VarEnv<'a>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    /// Random bits the last resolution asked to re-randomise.
    pub fn reseed(&self) -> u32 {
        self.reseed
    }

    pub fn used_triggers(&self) -> u32 {
        self.used_triggers
    }

    pub fn temp_register(&self, index: usize) -> u32 {
        self.temp.get(index).copied().unwrap_or(0)
    }

    pub fn resolve(&mut self, group: Option<GroupId>) -> Resolved {
        self.resolve_at(group, 0)
    }

    fn resolve_at(&mut self, group: Option<GroupId>, depth: u32) -> Resolved {
        if depth > MAX_DEPTH {
            return Resolved::Empty;
        }
        let pool = self.pool;
        let Some(group) = group.and_then(|id| pool.get(id)) else {
            return Resolved::Empty;
        };
        match group {
            SpriteGroup::Callback(value) => Resolved::Callback(*value),
            SpriteGroup::Result {
                sprite,
                num_sprites,
            } => Resolved::Sprite {
                sprite: *sprite,
                num_sprites: *num_sprites,
            },
            SpriteGroup::Real(real) => {
                let child = self.scope.select_real(real);
                self.resolve_at(child, depth + 1)
            }
            SpriteGroup::Deterministic(det) => self.resolve_deterministic(det, depth),
            SpriteGroup::Randomized(rnd) => self.resolve_randomized(rnd, depth),
        }
    }

    fn variable(&mut self, scope: VarScope, adjust: &VarAdjust, depth: u32) -> Option<u32> {
        match adjust.variable {
            0x0C => Some(u32::from(self.callback)),
            0x10 => Some(self.callback_param1),
            0x18 => Some(self.callback_param2),
            0x1C => Some(self.last_value),
            0x7D => Some(self.temp_register(adjust.parameter as usize)),
            0x7E => {
                let value = match self.resolve_at(adjust.subroutine, depth + 1) {
                    Resolved::Callback(v) => v,
                    _ => CALLBACK_FAILED,
                };
                Some(u32::from(value))
            }
            0x7F => Some(self.env.map_or(0, |env| env.params.get(adjust.parameter as usize))),
            v @ 0x00..=0x3F => match self.env.and_then(|env| global_variable(v, env)) {
                Some(value) => Some(value),
                None => self.scope.variable(scope, v, adjust.parameter),
            },
            v => self.scope.variable(scope, v, adjust.parameter),
        }
    }

    fn resolve_deterministic(&mut self, det: &DeterministicGroup, depth: u32) -> Resolved {
        let mut last = 0u32;
        for adjust in &det.adjusts {
            let Some(value) = self.variable(det.scope, adjust, depth) else {
                return self.resolve_at(det.error_group(), depth + 1);
            };
            last = self.eval_adjust(det.size, adjust, last, value);
        }
        self.last_value = last;

        if det.ranges.is_empty() {
            // Computed callback result.
            return Resolved::Callback((last & 0x7FFF) as u16);
        }

        let target = det
            .ranges
            .iter()
            .find(|r| r.low <= last && last <= r.high)
            .map_or(det.default, |r| r.group);
        self.resolve_at(target, depth + 1)
    }

    fn eval_adjust(&mut self, size: GroupSize, adjust: &VarAdjust, last: u32, value: u32) -> u32 {
        let mut value = value.checked_shr(u32::from(adjust.shift)).unwrap_or(0) & adjust.and_mask;
        match adjust.kind {
            AdjustType::None => {}
            AdjustType::Div | AdjustType::Mod => {
                let lhs = size.signed(value).wrapping_add(size.signed(adjust.add_val));
                let rhs = match size.signed(adjust.divmod_val) {
                    0 => 1,
                    d => d,
                };
                value = if adjust.kind == AdjustType::Div {
                    lhs.wrapping_div(rhs) as u32
                } else {
                    lhs.wrapping_rem(rhs) as u32
                };
            }
        }

        let (u_last, u_val) = (size.unsigned(last), size.unsigned(value));
        let (s_last, s_val) = (size.signed(last), size.signed(value));
        let result = match adjust.op {
            AdjustOp::Add => last.wrapping_add(value),
            AdjustOp::Sub => last.wrapping_sub(value),
            AdjustOp::SMin => s_last.min(s_val) as u32,
            AdjustOp::SMax => s_last.max(s_val) as u32,
            AdjustOp::UMin => u_last.min(u_val),
            AdjustOp::UMax => u_last.max(u_val),
            AdjustOp::SDiv => match s_val {
                0 => s_last as u32,
                v => s_last.wrapping_div(v) as u32,
            },
            AdjustOp::SMod => match s_val {
                0 => s_last as u32,
                v => s_last.wrapping_rem(v) as u32,
            },
            AdjustOp::UDiv => u_last.checked_div(u_val).unwrap_or(u_last),
            AdjustOp::UMod => u_last.checked_rem(u_val).unwrap_or(u_last),
            AdjustOp::Mul => last.wrapping_mul(value),
            AdjustOp::And => last & value,
            AdjustOp::Or => last | value,
            AdjustOp::Xor => last ^ value,
            AdjustOp::Sto => {
                if let Some(slot) = self.temp.get_mut(u_val as usize) {
                    *slot = s_last as u32;
                }
                last
            }
            AdjustOp::Rst => value,
            AdjustOp::Stop => {
                self.scope.store_persistent(u_val, s_last as u32);
                last
            }
            AdjustOp::Ror => u_last.rotate_right(u_val & 0x1F),
            AdjustOp::SCmp => cmp_result(s_last.cmp(&s_val)),
            AdjustOp::UCmp => cmp_result(u_last.cmp(&u_val)),
            AdjustOp::Shl => u_last << (u_val & 0x1F),
            AdjustOp::Shr => u_last >> (u_val & 0x1F),
            AdjustOp::Sar => (s_last >> (u_val & 0x1F)) as u32,
        };
        size.unsigned(result)
    }

    fn resolve_randomized(&mut self, rnd: &RandomizedGroup, depth: u32) -> Resolved {
        let n = rnd.groups.len() as u32;
        if n == 0 {
            return Resolved::Empty;
        }
        let mask = n.next_power_of_two() - 1;

        if rnd.triggers != 0 {
            let triggers = u32::from(rnd.triggers);
            let waiting = self.scope.waiting_triggers(rnd.scope);
            let matched = match rnd.mode {
                TriggerMode::Any => waiting & triggers != 0,
                TriggerMode::All => waiting & triggers == triggers,
            };
            if matched {
                self.used_triggers |= waiting & triggers;
                self.reseed |= mask
                    .checked_shl(u32::from(rnd.lowest_randbit))
                    .unwrap_or(0);
            }
        }

        let bits = self.scope.random_bits(rnd.scope);
        let index = bits.checked_shr(u32::from(rnd.lowest_randbit)).unwrap_or(0) & mask;
        // Non power-of-two counts wrap around.
        let child = rnd.groups[(index % n) as usize];
        self.resolve_at(child, depth + 1)
    }
}

fn cmp_result(ord: std::cmp::Ordering) -> u32 {
    match ord {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Equal => 1,
        std::cmp::Ordering::Greater => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scope with a fixed variable table.
    #[derive(Default)]
    struct Vars {
        values: HashMap<u8, u32>,
        random: u32,
        triggers: u32,
    }

    impl ScopeResolver for Vars {
        fn variable(&self, _scope: VarScope, variable: u8, _parameter: u8) -> Option<u32> {
            self.values.get(&variable).copied()
        }

        fn random_bits(&self, _scope: VarScope) -> u32 {
            self.random
        }

        fn waiting_triggers(&self, _scope: VarScope) -> u32 {
            self.triggers
        }
    }

    fn adjust(op: AdjustOp, variable: u8) -> VarAdjust {
        VarAdjust {
            op,
            kind: AdjustType::None,
            variable,
            parameter: 0,
            subroutine: None,
            shift: 0,
            and_mask: 0xFFFF_FFFF,
            add_val: 0,
            divmod_val: 1,
        }
    }

    fn det(adjusts: Vec<VarAdjust>, ranges: Vec<GroupRange>, default: Option<GroupId>) -> SpriteGroup {
        SpriteGroup::Deterministic(DeterministicGroup {
            scope: VarScope::Current,
            size: GroupSize::Dword,
            adjusts,
            ranges,
            default,
        })
    }

    fn vars(pairs: &[(u8, u32)]) -> Vars {
        Vars {
            values: pairs.iter().copied().collect(),
            ..Vars::default()
        }
    }

    #[test]
    fn adjusts_accumulate_left_to_right() {
        let mut pool = SpriteGroupPool::new();
        // ((10 + 0) - 3) * 4 = 28, then computed callback.
        let g = pool.insert(det(
            vec![
                adjust(AdjustOp::Add, 0x40),
                adjust(AdjustOp::Sub, 0x41),
                adjust(AdjustOp::Mul, 0x42),
            ],
            vec![],
            None,
        ));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 10), (0x41, 3), (0x42, 4)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(28));
    }

    #[test]
    fn first_matching_range_wins() {
        let mut pool = SpriteGroupPool::new();
        let a = pool.callback(1);
        let b = pool.callback(2);
        let fallback = pool.callback(3);
        let g = pool.insert(det(
            vec![adjust(AdjustOp::Add, 0x40)],
            vec![
                GroupRange { group: Some(a), low: 0, high: 10 },
                GroupRange { group: Some(b), low: 5, high: 20 },
            ],
            Some(fallback),
        ));

        let mut r = Resolver::new(&pool, vars(&[(0x40, 7)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(1));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 15)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(2));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 99)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(3));
    }

    #[test]
    fn missing_children_are_empty() {
        let mut pool = SpriteGroupPool::new();
        let g = pool.insert(det(
            vec![adjust(AdjustOp::Add, 0x40)],
            vec![GroupRange { group: None, low: 0, high: 0 }],
            None,
        ));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 0)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Empty);
        assert_eq!(r.resolve(None), Resolved::Empty);
        assert_eq!(r.resolve(Some(GroupId::from_raw(999))), Resolved::Empty);
    }

    #[test]
    fn unavailable_variable_uses_first_range() {
        let mut pool = SpriteGroupPool::new();
        let first = pool.callback(0x10);
        let other = pool.callback(0x20);
        let g = pool.insert(det(
            vec![adjust(AdjustOp::Add, 0x99)],
            vec![GroupRange { group: Some(first), low: 5, high: 5 }],
            Some(other),
        ));
        let mut r = Resolver::new(&pool, Vars::default());
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(0x10));
    }

    #[test]
    fn byte_groups_wrap_and_compare_signed() {
        let mut pool = SpriteGroupPool::new();
        let g = pool.insert(SpriteGroup::Deterministic(DeterministicGroup {
            scope: VarScope::Current,
            size: GroupSize::Byte,
            adjusts: vec![adjust(AdjustOp::Add, 0x40), adjust(AdjustOp::SCmp, 0x41)],
            ranges: vec![],
            default: None,
        }));
        // 0xFF is -1 as a signed byte, so it compares below 1.
        let mut r = Resolver::new(&pool, vars(&[(0x40, 0xFF), (0x41, 1)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(0));
    }

    #[test]
    fn division_by_zero_keeps_running_value() {
        let mut pool = SpriteGroupPool::new();
        let g = pool.insert(det(
            vec![adjust(AdjustOp::Add, 0x40), adjust(AdjustOp::UDiv, 0x41)],
            vec![],
            None,
        ));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 77), (0x41, 0)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(77));
    }

    #[test]
    fn temp_registers_round_trip_through_0x7d() {
        let mut pool = SpriteGroupPool::new();
        let mut load = adjust(AdjustOp::Add, 0x7D);
        load.parameter = 5;
        let g = pool.insert(det(
            vec![
                adjust(AdjustOp::Add, 0x40),
                // Store 42 in register 5 (value of var 0x41).
                adjust(AdjustOp::Sto, 0x41),
                adjust(AdjustOp::Rst, 0x42),
                load,
            ],
            vec![],
            None,
        ));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 42), (0x41, 5), (0x42, 100)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(142));
        assert_eq!(r.temp_register(5), 42);
    }

    #[test]
    fn divmod_adjust_type() {
        let mut pool = SpriteGroupPool::new();
        let mut a = adjust(AdjustOp::Add, 0x40);
        a.kind = AdjustType::Div;
        a.add_val = 2;
        a.divmod_val = 4;
        let g = pool.insert(det(vec![a], vec![], None));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 10)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(3));
    }

    #[test]
    fn randomized_picks_by_bits_and_reseeds() {
        let mut pool = SpriteGroupPool::new();
        let children: Vec<_> = (0..4).map(|i| Some(pool.callback(i))).collect();
        let g = pool.insert(SpriteGroup::Randomized(RandomizedGroup {
            scope: VarScope::Current,
            mode: TriggerMode::All,
            triggers: 0b11,
            count: 0,
            lowest_randbit: 4,
            groups: children,
        }));

        let scope = Vars {
            random: 0b10_0000,
            triggers: 0b11,
            ..Vars::default()
        };
        let mut r = Resolver::new(&pool, scope);
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(2));
        assert_eq!(r.reseed(), 0b11_0000);
        assert_eq!(r.used_triggers(), 0b11);
    }

    #[test]
    fn subroutine_result_feeds_the_chain() {
        let mut pool = SpriteGroupPool::new();
        let sub = pool.callback(9);
        let mut call = adjust(AdjustOp::Add, 0x7E);
        call.subroutine = Some(sub);
        let g = pool.insert(det(vec![call, adjust(AdjustOp::Add, 0x40)], vec![], None));
        let mut r = Resolver::new(&pool, vars(&[(0x40, 1)]));
        assert_eq!(r.resolve(Some(g)), Resolved::Callback(10));
    }

    #[test]
    fn real_groups_default_to_first_loaded() {
        let mut pool = SpriteGroupPool::new();
        let s = pool.insert(SpriteGroup::Result { sprite: 0x4000, num_sprites: 8 });
        let g = pool.insert(SpriteGroup::Real(RealGroup {
            loaded: vec![Some(s)],
            loading: vec![],
        }));
        let mut r = Resolver::new(&pool, Vars::default());
        assert_eq!(
            r.resolve(Some(g)),
            Resolved::Sprite { sprite: 0x4000, num_sprites: 8 }
        );
    }

    #[test]
    fn callback_nodes_are_shared() {
        let mut pool = SpriteGroupPool::new();
        let a = pool.callback(5);
        let b = pool.callback(5);
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }
}

use std::sync::Arc;

use hookwatch_diagnostics::Diagnostics;
use hookwatch_host::{HostError, HostValue};
use hookwatch_intercept::{HookError, HookSpec, MemberTarget};

use super::GroupEnv;
use crate::DurabilityConfig;
use crate::classes::ClassDirectory;
use crate::reflect::{set_property, short_type_name, walk};

/// Vanilla crock block.
pub const CROCK_TYPE: &str = "Vintagestory.GameContent.BlockCrock";
/// Base type of every item and block.
pub const COLLECTIBLE_TYPE: &str = "Vintagestory.API.Common.CollectibleObject";
/// Unqualified name of the carved crock block class.
pub const CARVED_CROCK_CLASS: &str = "BlockCarvedCrock";

pub(super) fn crock_specs() -> Vec<HookSpec> {
	vec![HookSpec::before(MemberTarget::method(CROCK_TYPE, "MatchesForCrafting"), |call| {
		if is_crock_conversion(call.arg(1))? {
			call.skip_original(HostValue::Bool(true));
		}
		Ok(())
	})]
}

/// A recipe that turns a plain crock into a carved one without sealing it.
///
/// Sealing recipes carry an ingredient with `canSealCrock`; those keep the
/// vanilla matching rules.
fn is_crock_conversion(recipe: Option<&HostValue>) -> Result<bool, HostError> {
	let Some(recipe) = recipe else {
		return Ok(false);
	};
	let Some(output) = walk(recipe, &["Output", "ResolvedItemstack", "Collectible"])? else {
		return Ok(false);
	};
	let carved = output.as_object().is_some_and(|obj| short_type_name(obj.type_name()) == CARVED_CROCK_CLASS);
	if !carved {
		return Ok(false);
	}

	let ingredients = recipe.property("resolvedIngredients")?.unwrap_or_default();
	for ingredient in ingredients.as_list().unwrap_or_default() {
		let seals = walk(ingredient, &["ResolvedItemstack", "ItemAttributes", "canSealCrock"])?;
		if seals.and_then(|v| v.as_bool()) == Some(true) {
			return Ok(false);
		}
	}
	Ok(true)
}

pub(super) fn durability_specs(env: &GroupEnv) -> Vec<HookSpec> {
	let config = Arc::new(env.config.durability.clone());
	vec![
		mark_crafted(env.diagnostics.clone(), env.classes.clone(), config.clone()),
		scale_durability(config),
	]
}

/// Stores the bonus on items whose crafter's class has the configured trait.
fn mark_crafted(d: Arc<Diagnostics>, classes: ClassDirectory, config: Arc<DurabilityConfig>) -> HookSpec {
	HookSpec::after(MemberTarget::method(COLLECTIBLE_TYPE, "OnCreatedByCrafting"), move |call| {
		let slot = call.arg(1).ok_or(HookError::MissingArgument(1))?;
		let (Some(player), Some(stack)) = (walk(slot, &["Inventory", "Player"])?, slot.property("Itemstack")?) else {
			return Ok(());
		};

		// Items without durability report 0 or 1.
		let max = walk(&stack, &["Collectible", "Durability"])?.and_then(|v| v.as_int()).unwrap_or(0);
		if max <= 1 {
			return Ok(());
		}

		let Some(code) = walk(&player, &["Entity", "WatchedAttributes", "characterClass"])? else {
			return Ok(());
		};
		let Some(code) = code.as_str() else {
			return Ok(());
		};
		let Some(class) = classes.find(code)? else {
			return Ok(());
		};
		if !class.has_trait(&config.trait_code) {
			return Ok(());
		}

		let attributes = stack.property("Attributes")?.unwrap_or_default();
		set_property(&attributes, &config.attribute, HostValue::Float(config.multiplier))?;
		d.verbose(format_args!("'{code}' crafted an item with {} durability; bonus x{} stored", max, config.multiplier));
		Ok(())
	})
}

/// Applies a stored bonus to the computed maximum durability.
fn scale_durability(config: Arc<DurabilityConfig>) -> HookSpec {
	HookSpec::after(MemberTarget::method(COLLECTIBLE_TYPE, "GetMaxDurability"), move |call| {
		let Some(stack) = call.arg(0).filter(|v| !v.is_null()) else {
			return Ok(());
		};
		let Some(base) = call.result.as_int().filter(|v| *v != 0) else {
			return Ok(());
		};
		let bonus = walk(stack, &["Attributes", config.attribute.as_str()])?.and_then(|v| v.as_float()).filter(|b| b.is_finite() && *b > 0.0);
		if let Some(bonus) = bonus {
			call.replace_result(HostValue::Int((base as f64 * bonus).round() as i64));
		}
		Ok(())
	})
}

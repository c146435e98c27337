quantity!(Celsius, "°C", 1);
